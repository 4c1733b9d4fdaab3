use cpgexport::demangle;

#[test]
fn test_demangle_plain_two_segment_path() {
    assert_eq!(demangle("_ZN3foo3barE"), "foo::bar");
}

#[test]
fn test_demangle_accepts_envelope_without_underscore() {
    assert_eq!(demangle("ZN4core3fmtE"), "core::fmt");
}

#[test]
fn test_demangle_returns_input_without_envelope() {
    assert_eq!(demangle("main"), "main");
    assert_eq!(demangle("foo::bar"), "foo::bar");
    assert_eq!(demangle(""), "");
    assert_eq!(demangle("_ZN3foo"), "_ZN3foo");
}

#[test]
fn test_demangle_drops_trailing_hash() {
    assert_eq!(
        demangle("_ZN4core3ptr13drop_in_place17h1234567890abcdefE"),
        "core::ptr::drop_in_place"
    );
}

#[test]
fn test_demangle_hash_only_symbol_returns_input() {
    let symbol = "_ZN17habcdefghijklmnopE";
    assert_eq!(demangle(symbol), symbol);
}

#[test]
fn test_demangle_dot_expands_to_path_separator() {
    assert_eq!(demangle("_ZN3a.bE"), "a::b");
}

#[test]
fn test_demangle_angle_bracket_escapes() {
    assert_eq!(demangle("_ZN12_$LT$Foo$GT$3fooE"), "<Foo>::foo");
}

#[test]
fn test_demangle_symbol_table_escapes() {
    assert_eq!(demangle("_ZN4$SP$E"), "@");
    assert_eq!(demangle("_ZN4$BP$E"), "*");
    assert_eq!(demangle("_ZN4$RF$E"), "&");
    assert_eq!(demangle("_ZN4$LP$E"), "(");
    assert_eq!(demangle("_ZN4$RP$E"), ")");
    assert_eq!(demangle("_ZN3$C$E"), ",");
}

#[test]
fn test_demangle_unicode_escape() {
    assert_eq!(demangle("_ZN7$u2764$E"), "\u{2764}");
}

#[test]
fn test_demangle_unicode_escape_inside_segment() {
    assert_eq!(demangle("_ZN10as$u20$ref3getE"), "as ref::get");
}

#[test]
fn test_demangle_unknown_escape_yields_placeholder() {
    assert_eq!(demangle("_ZN4$XY$E"), "???");
}

#[test]
fn test_demangle_bad_unicode_escape_yields_placeholder() {
    // Not valid hex.
    assert_eq!(demangle("_ZN5$uzz$E"), "???");
    // Valid hex, not a Unicode scalar.
    assert_eq!(demangle("_ZN7$ud800$E"), "???");
}

#[test]
fn test_demangle_unclosed_escape_emits_literal_run() {
    assert_eq!(demangle("_ZN4$LTxE"), "LTx");
}

#[test]
fn test_demangle_zero_length_segment() {
    assert_eq!(demangle("_ZN03fooE"), "::foo");
}

#[test]
fn test_demangle_body_without_digits_returns_input() {
    let symbol = "_ZNfooE";
    assert_eq!(demangle(symbol), symbol);
}

#[test]
fn test_demangle_overrunning_length_returns_input() {
    let symbol = "_ZN9fooE";
    assert_eq!(demangle(symbol), symbol);
}

#[test]
fn test_demangle_huge_declared_length_returns_input() {
    // usize::MAX as a segment length must not overflow the bound check.
    let symbol = "_ZN18446744073709551615E";
    assert_eq!(demangle(symbol), symbol);
    let symbol = "_ZN18446744073709551615fooE";
    assert_eq!(demangle(symbol), symbol);
}

#[test]
fn test_demangle_empty_body_returns_input() {
    assert_eq!(demangle("_ZNE"), "_ZNE");
}

#[test]
fn test_demangle_is_stable_on_own_output() {
    let demangled = demangle("_ZN3foo3barE");
    assert_eq!(demangle(&demangled), demangled);
}
