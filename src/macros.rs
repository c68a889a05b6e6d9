#![allow(unused_macros)]
macro_rules! general_err {
    ($msg:expr) => {
        crate::error::Error::new(crate::error::ErrorKind::General, None, format!("{}", $msg).as_str())
    };
}
macro_rules! runtime_err {
    ($ctx:expr,$($msg:expr),*) => {
        crate::error::Error::new(
            crate::error::ErrorKind::Runtime,
            $ctx,
            format!("{} {}", red!("Runtime Error"), format!($($msg),*)).as_str(),
        )
    };
}
macro_rules! color {
    ($color: literal, $msg: expr) => {
        concat!("\x1b[", $color, "m", $msg, "\x1b[0m")
    };
}
macro_rules! red {
    ($msg:expr) => {
        color!(91, $msg)
    };
}
macro_rules! green {
    ($msg:expr) => {
        color!(92, $msg)
    };
}
macro_rules! yellow {
    ($msg:expr) => {
        color!(93, $msg)
    };
}
macro_rules! blue {
    ($msg:expr) => {
        color!(94, $msg)
    };
}
