pub mod check;
pub mod detect;
pub mod extract;
pub mod normalize;
pub mod types;

pub use check::check_digit;
pub use detect::detect_format;
pub use extract::{decode, MrzDecoder};
pub use normalize::{normalize_date, parse_name, strip_filler};
pub use types::{
    CheckDigits, DecodeFailure, DecodeResult, DecodedDocument, FailureReason, MrzFormat, NameParts,
};
