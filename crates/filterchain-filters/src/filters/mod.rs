mod contrast;
mod gaussian_blur;
mod grayscale;
mod invert;
mod sobel;
mod threshold;

pub use contrast::ContrastStretch;
pub use gaussian_blur::GaussianBlur;
pub use grayscale::Grayscale;
pub use invert::Invert;
pub use sobel::SobelEdges;
pub use threshold::Threshold;
