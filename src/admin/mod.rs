//! Store-admin glue: signed links, notices and redirect targets.

pub mod nonce;
pub mod notice;
pub mod urls;

pub use nonce::{HmacNonce, NonceVerifier};
pub use notice::{Notice, NoticeAction, Severity};
pub use urls::UrlBuilder;
