//! Screen controllers.

mod sign_in;

pub use sign_in::{
    DEFAULT_REDIRECT, REDIRECT_PARAM, SIGN_IN_ERROR_DESCRIPTION, SIGN_IN_ERROR_TITLE,
    SignInScreen, SignInView, redirect_target,
};
