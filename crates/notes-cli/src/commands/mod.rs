pub mod cipher;
pub mod device;
pub mod misc;
