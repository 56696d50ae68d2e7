pub mod redirect;

pub use redirect::{MatchType, NewRedirect, Redirect, RedirectView};
