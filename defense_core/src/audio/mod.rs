pub mod assets;
pub mod decode;
