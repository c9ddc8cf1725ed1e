use finreport::report;

#[test]
fn a_csv_upload_becomes_a_parsable_pdf_report() {
    let file_content = "\
date,account_from,account_to,amount
2024-03-01,ACC-1,ACC-2,150.75
2024-03-02,ACC-3,ACC-3,19.99
2024-03-04,ACC-2,ACC-1,75.00
";
    let report_bytes = report::generate_from_csv(file_content.as_bytes(), "bob").unwrap();
    assert!(report_bytes.starts_with(b"%PDF-1.5"));

    let document = lopdf::Document::load_mem(&report_bytes).unwrap();
    assert_eq!(document.get_pages().len(), 1);

    let page_id = document.get_pages()[&1];
    let content_bytes = document.get_page_content(page_id).unwrap();
    let page_content = String::from_utf8_lossy(&content_bytes);
    assert!(page_content.contains("Authenticated user: bob - access granted"));
    assert!(page_content.contains("2024-03-02 - ACC-3 -> ACC-3 : $19.99"));
}

#[test]
fn a_malformed_upload_fails_without_producing_a_document() {
    let file_content = "\
date,account_from,account_to,amount
2024-03-01,ACC-1,ACC-2,150.75
not-a-date,ACC-1,ACC-2,10.00
";
    let error = report::generate_from_csv(file_content.as_bytes(), "bob").unwrap_err();
    assert!(error.to_string().contains("line 3"));
}
