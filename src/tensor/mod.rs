mod tensor3;
mod tensor4;
mod matrix;

pub use tensor3::Tensor3;
pub use tensor4::Tensor4;
pub use matrix::Matrix;
