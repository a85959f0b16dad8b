//! Error codes for all frontend diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating the class of problem.

use std::fmt;

/// Error codes for all frontend diagnostics.
///
/// Format: E#### where first digit indicates the class:
/// - E0xxx: Structural errors (malformed program shape)
/// - E1xxx: Scoping errors (name resolution)
/// - E2xxx: Type errors
/// - E3xxx: Semantic errors (constant evaluation)
/// - E9xxx: Internal compiler errors
/// - Wxxxx: Warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Structural Errors (E0xxx)
    /// Invalid bit-vector width (`bit<0>`, `int<1>`)
    E0001,
    /// Constructor parameter with a direction
    E0002,
    /// Parser without a `start` state
    E0003,
    /// User declaration of a reserved parser state (`accept`, `reject`)
    E0004,
    /// `default` switch label is not the last label
    E0005,
    /// Directional action parameter after a directionless one
    E0006,
    /// Duplicate table property
    E0007,

    // Scoping Errors (E1xxx)
    /// Undeclared name
    E1001,
    /// Use before declaration
    E1002,
    /// Duplicate declaration in one scope
    E1003,
    /// Not a member of the qualifying type
    E1004,
    /// Cyclic type reference
    E1005,
    /// Name does not denote a type
    E1006,

    // Type Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Literal does not fit the target width
    E2002,
    /// Operator not applicable to operand types
    E2003,
    /// Argument count mismatch
    E2004,
    /// Cannot infer type arguments
    E2005,
    /// Expression is not a left value
    E2006,
    /// Illegal cast
    E2007,
    /// Invalid slice bounds
    E2008,
    /// Unknown member or method
    E2009,
    /// Misplaced or ill-typed `return` / `exit`
    E2010,
    /// Type argument count mismatch
    E2011,
    /// Expression is not callable or not instantiable
    E2012,
    /// Value is not a compile-time constant
    E2013,

    // Semantic Errors (E3xxx)
    /// Division or modulo by zero
    E3001,
    /// Negative or oversized shift amount
    E3002,
    /// Literal width or signedness mismatch during folding
    E3003,
    /// Invalid constant slice or cast
    E3004,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
    /// Too many errors
    E9002,

    // Warnings
    /// Declaration shadows a declaration of a different kind
    W1001,
}

impl ErrorCode {
    /// All error codes, in declaration order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E0005,
        ErrorCode::E0006,
        ErrorCode::E0007,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::W1001,
    ];

    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::W1001 => "W1001",
        }
    }

    /// Leading character and digit of the code, e.g. `('E', 2)`.
    fn class(self) -> (u8, u8) {
        let bytes = self.as_str().as_bytes();
        (bytes[0], bytes[1] - b'0')
    }

    /// Check if this is a structural error (E0xxx range).
    pub fn is_structural_error(&self) -> bool {
        self.class() == (b'E', 0)
    }

    /// Check if this is a scoping error (E1xxx range).
    pub fn is_scoping_error(&self) -> bool {
        self.class() == (b'E', 1)
    }

    /// Check if this is a type error (E2xxx range).
    pub fn is_type_error(&self) -> bool {
        self.class() == (b'E', 2)
    }

    /// Check if this is a semantic error (E3xxx range).
    pub fn is_semantic_error(&self) -> bool {
        self.class() == (b'E', 3)
    }

    /// Check if this is an internal compiler error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        self.class() == (b'E', 9)
    }

    /// Check if this is a warning code (Wxxxx range).
    pub fn is_warning(&self) -> bool {
        self.class().0 == b'W'
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"` or `"W1001"`.
///
/// Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
