use super::*;

#[test]
fn codes_display_as_their_name() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::W1001.to_string(), "W1001");
}

#[test]
fn classes_follow_the_leading_digit() {
    assert!(ErrorCode::E0003.is_structural_error());
    assert!(ErrorCode::E1002.is_scoping_error());
    assert!(ErrorCode::E2001.is_type_error());
    assert!(ErrorCode::E3001.is_semantic_error());
    assert!(ErrorCode::E9001.is_internal_error());
    assert!(ErrorCode::W1001.is_warning());
    assert!(!ErrorCode::E2001.is_scoping_error());
    assert!(!ErrorCode::E9001.is_warning());
}

#[test]
fn every_code_belongs_to_exactly_one_class() {
    for code in ErrorCode::ALL {
        let classes = [
            code.is_structural_error(),
            code.is_scoping_error(),
            code.is_type_error(),
            code.is_semantic_error(),
            code.is_internal_error(),
            code.is_warning(),
        ];
        assert_eq!(classes.iter().filter(|&&c| c).count(), 1, "{code}");
    }
}

#[test]
fn parse_is_case_insensitive() {
    assert_eq!("e2005".parse::<ErrorCode>(), Ok(ErrorCode::E2005));
    assert_eq!("w1001".parse::<ErrorCode>(), Ok(ErrorCode::W1001));
    assert_eq!("E4242".parse::<ErrorCode>(), Err(()));
}

#[test]
fn all_codes_round_trip_through_strings() {
    for &code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(code));
    }
}
