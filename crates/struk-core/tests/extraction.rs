use pretty_assertions::assert_eq;
use struk_core::{
    extract, normalize_amount, DocumentType, ExtractionError, Provenance, ReceiptExtractor,
    StrukConfig,
};

#[test]
fn no_digits_means_missing_amount_and_low_confidence() {
    let result = extract(&["WARUNG MAKAN", "TERIMA KASIH", "SELAMAT DATANG KEMBALI"]);

    assert_eq!(result.amount.provenance, Provenance::Missing);
    assert_eq!(result.amount.value, None);
    assert!(result.confidence < StrukConfig::default().extraction.low_confidence_threshold);
    assert!(result.requires_confirmation);
    assert_eq!(result.require_amount(), Err(ExtractionError::NoAmountFound));
}

#[test]
fn grand_total_outranks_total_and_subtotal() {
    let result = extract(&["Subtotal 50.000", "Grand Total 89.000", "Total 99.000"]);

    assert_eq!(result.document_type, DocumentType::Receipt);
    assert_eq!(result.amount.value, Some(89_000));
    assert_eq!(result.amount.provenance, Provenance::MatchedKeyword);
}

#[test]
fn largest_amount_without_keyword() {
    let result = extract(&["12.000", "45.000", "8.000"]);

    assert_eq!(result.amount.value, Some(45_000));
    assert_eq!(result.amount.provenance, Provenance::Fallback);
    assert_eq!(result.document_type, DocumentType::Unknown);
}

#[test]
fn bank_proof_ignores_balance_and_fee() {
    let result = extract(&["Saldo 5.000.000", "Nominal Transfer 150.000", "Admin 2.500"]);

    assert_eq!(result.document_type, DocumentType::BankProof);
    assert_eq!(result.amount.value, Some(150_000));
    assert_eq!(result.category.value.as_deref(), Some("Transfer/Bank"));
    assert!(result.merchant.is_missing());
}

#[test]
fn overflowing_shorthand_total_does_not_win() {
    let result = extract(&["TOKO", "TOTAL 9999999999999999999999999999rb"]);

    assert_eq!(result.amount.value, None);
    assert_eq!(result.amount.provenance, Provenance::Missing);
    assert!(result.requires_confirmation);
}

#[test]
fn qris_proof_skips_terminal_id_for_total_bayar() {
    let result = extract(&[
        "Pembayaran QRIS Berhasil",
        "Kopi Janji Jiwa",
        "Total Bayar Rp 25.000",
        "Terminal ID 1234567",
        "12/03/2024 10:11",
    ]);

    assert_eq!(result.document_type, DocumentType::BankProof);
    assert_eq!(result.amount.value, Some(25_000));
    assert_eq!(result.amount.provenance, Provenance::MatchedKeyword);
}

#[test]
fn amount_normalization() {
    assert_eq!(normalize_amount("25rb"), Ok(25_000));
    assert_eq!(normalize_amount("180.000"), Ok(180_000));
    assert_eq!(normalize_amount("2.500.000"), Ok(2_500_000));
    assert_eq!(normalize_amount("Rp 1,5 juta"), Ok(1_500_000));
    assert!(normalize_amount("Rp").is_err());
}

#[test]
fn extraction_is_deterministic() {
    let lines = [
        "INDOMARET",
        "Jl. Merdeka No. 10",
        "13/02/2026 19:04",
        "Aqua 600ml 2 x 4.000 8.000",
        "TOTAL 8.000",
        "TUNAI 10.000",
        "KEMBALIAN 2.000",
    ];
    let extractor = ReceiptExtractor::default();

    let first = extractor.extract(&lines);
    let second = extractor.extract(&lines);

    assert_eq!(first, second);
    assert_eq!(first.amount.value, Some(8_000));
    assert_eq!(first.merchant.value.as_deref(), Some("INDOMARET"));
}

#[test]
fn summary_reply_for_clean_receipt() {
    let result = extract(&["KOPI KENANGAN", "12/03/2024", "TOTAL Rp 54.000"]);

    assert!(!result.requires_confirmation);
    assert_eq!(
        result.reply_text,
        "Wah, struk dari KOPI KENANGAN ya! Berhasil dicatat nih:\n\n\
         Total: Rp54.000\n\nKategori: -\n\nTanggal: 12/03/2024\n\n\
         Mau langsung simpan atau ada yang mau diubah?"
    );
}

#[test]
fn noisy_block_asks_for_manual_total() {
    let result = extract(&["T0K#@! M~~J", "%%$#", "T0T#L ~~"]);

    assert!(result.requires_confirmation);
    assert!(result
        .reply_text
        .starts_with("Sepertinya struknya agak buram, boleh konfirmasi total belanjanya berapa, Kak?"));
}
