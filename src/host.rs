//! Page Host
//!
//! Page-wide effects the controllers trigger but do not own.

pub trait PageHost {
    /// Blocking notice to the user
    fn alert(&self, message: &str);
    /// Full reload; the server-rendered board is the source of truth
    fn reload(&self);
}
