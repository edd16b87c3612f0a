use furniture_store_api::validation::{
    contains_pattern, ensure_gst, ensure_password, ensure_phone, ensure_pin_code, ensure_present, is_valid_email,
    is_valid_gst, is_valid_phone, is_valid_pin_code, normalize_phone, slugify,
};

#[test]
fn accepts_well_formed_gst_numbers() {
    assert!(is_valid_gst("27ABCDE1234F1Z5"));
    assert!(is_valid_gst("29AAGCB7383J1Z4"));
    // trimmed and upper-cased first
    assert!(is_valid_gst("  27abcde1234f1z5 "));
    assert_eq!(ensure_gst("27abcde1234f1z5").unwrap(), "27ABCDE1234F1Z5");
}

#[test]
fn rejects_malformed_gst_numbers() {
    for bad in [
        "",
        "27ABCDE1234F1Z",   // too short
        "27ABCDE1234F1Z55", // too long
        "2AABCDE1234F1Z5",  // state code must be two digits
        "27ABCD01234F1Z5",  // PAN letters
        "27ABCDE1234F0Z5",  // entity number cannot be 0
        "27ABCDE1234F1X5",  // missing the fixed Z
    ] {
        assert!(!is_valid_gst(bad), "{bad} should be rejected");
    }
    assert!(ensure_gst("27ABCDE1234F1X5").is_err());
}

#[test]
fn phone_numbers_tolerate_country_prefix() {
    assert_eq!(normalize_phone("+91 98765 43210"), "9876543210");
    assert_eq!(normalize_phone("919876543210"), "9876543210");
    assert!(is_valid_phone("9876543210"));
    assert!(is_valid_phone("+91-98765-43210"));
    assert!(!is_valid_phone("5876543210"));
    assert!(!is_valid_phone("98765"));
    assert_eq!(ensure_phone("+91 70000 00001").unwrap(), "7000000001");
}

#[test]
fn pin_codes_are_six_digits_without_leading_zero() {
    assert!(is_valid_pin_code("560001"));
    assert!(!is_valid_pin_code("060001"));
    assert!(!is_valid_pin_code("56001"));
    assert!(ensure_pin_code("56000A").is_err());
}

#[test]
fn emails_and_passwords() {
    assert!(is_valid_email("buyer@example.com"));
    assert!(!is_valid_email("buyer@example"));
    assert!(!is_valid_email("buyer example.com"));
    assert!(ensure_password("12345").is_err());
    assert!(ensure_password("123456").is_ok());
}

#[test]
fn required_fields_are_trimmed() {
    assert_eq!(ensure_present("city", "  Pune ").unwrap(), "Pune");
    assert!(ensure_present("city", "   ").is_err());
}

#[test]
fn slugs_are_lowercase_dash_separated() {
    assert_eq!(slugify("Living Room"), "living-room");
    assert_eq!(slugify("  Home & Office!! "), "home-office");
}

#[test]
fn search_terms_match_wildcards_literally() {
    assert_eq!(contains_pattern("sofa"), "%sofa%");
    assert_eq!(contains_pattern("50%"), "%50\\%%");
    assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    assert_eq!(contains_pattern(r"c:\d"), r"%c:\\d%");
}
