use image::{DynamicImage, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::layout::element::LayoutBlock;

const LINE_THICKNESS: i32 = 3;

/// Copies the page and outlines every block in its label color.
///
/// Synthetic blocks are drawn in gray so patched gaps stand out.
pub fn draw_layout(image: &DynamicImage, blocks: &[LayoutBlock]) -> RgbImage {
    let mut output_img = image.to_rgb8();

    for block in blocks {
        let x = block.bbox.min.x as i32;
        let y = block.bbox.min.y as i32;
        let width = block.bbox.width() as u32;
        let height = block.bbox.height() as u32;

        if width == 0 || height == 0 {
            continue;
        }

        let color = if block.synthetic {
            Rgb([128, 128, 128])
        } else {
            Rgb(block.label.color())
        };

        // nested rectangles for a thicker line
        for offset in 0..LINE_THICKNESS {
            let thick_rect = Rect::at(x - offset, y - offset)
                .of_size(width + (offset * 2) as u32, height + (offset * 2) as u32);
            draw_hollow_rect_mut(&mut output_img, thick_rect, color);
        }
    }

    output_img
}
