mod raster;
mod typst;

pub use raster::{paginate, png_dimensions, scaled_height_mm, A4_HEIGHT_MM, A4_WIDTH_MM};
pub use typst::{export_pdf, print_document};
