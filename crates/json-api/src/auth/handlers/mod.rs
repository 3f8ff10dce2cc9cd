pub(crate) mod admin_login;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod signup;
