use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub fn create_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("png encoding should succeed");
    buffer
}

pub fn image_part(data: Vec<u8>, file_name: &str) -> Part {
    Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_type("image/png")
}

/// Form with a single `image` file field
pub fn image_form(width: u32, height: u32) -> MultipartForm {
    MultipartForm::new().add_part("image", image_part(create_png(width, height), "photo.png"))
}
