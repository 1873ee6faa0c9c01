use crate::geometry::Rect;

pub type Color = [u8; 4];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Fill { rect: Rect, color: Color },
    Outline { rect: Rect, color: Color },
}

/// One frame of flat-colored boxes in framebuffer pixels, drawn in order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    clear_color: Color,
    commands: Vec<DrawCommand>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self {
            clear_color: [0, 0, 0, 255],
            commands: Vec::new(),
        }
    }
}

impl DrawList {
    pub fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.commands.clear();
    }

    pub fn fill(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Fill { rect, color });
    }

    pub fn outline(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Outline { rect, color });
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
}

/// Integer pixel span `[left, right) x [top, bottom)` covered by `rect`.
pub(crate) fn pixel_bounds(rect: &Rect) -> (i32, i32, i32, i32) {
    (
        rect.left().floor() as i32,
        rect.top().floor() as i32,
        rect.right().ceil() as i32,
        rect.bottom().ceil() as i32,
    )
}

pub(crate) fn fill_rect_clipped(frame: &mut [u8], width: u32, height: u32, rect: &Rect, color: Color) {
    let (left, top, right, bottom) = pixel_bounds(rect);
    let left = left.max(0);
    let top = top.max(0);
    let right = right.min(width as i32);
    let bottom = bottom.min(height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

pub(crate) fn outline_rect_clipped(frame: &mut [u8], width: u32, height: u32, rect: &Rect, color: Color) {
    let (left, top, right, bottom) = pixel_bounds(rect);
    if right <= left || bottom <= top {
        return;
    }
    for x in left..right {
        if x >= 0 && x < width as i32 {
            write_pixel_rgba_clipped(frame, width as usize, x, top, color);
            write_pixel_rgba_clipped(frame, width as usize, x, bottom - 1, color);
        }
    }
    for y in top..bottom {
        if y >= 0 && y < height as i32 {
            write_pixel_rgba_clipped(frame, width as usize, left, y, color);
            write_pixel_rgba_clipped(frame, width as usize, right - 1, y, color);
        }
    }
}

pub(crate) fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];

    fn pixel(frame: &[u8], width: usize, x: usize, y: usize) -> Color {
        let offset = (y * width + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn fill_is_clipped_to_frame() {
        let mut frame = vec![0u8; 4 * 4 * 4];

        fill_rect_clipped(&mut frame, 4, 4, &Rect::new(-2.0, 2.0, 4.0, 10.0), RED);

        assert_eq!(pixel(&frame, 4, 0, 2), RED);
        assert_eq!(pixel(&frame, 4, 1, 3), RED);
        assert_eq!(pixel(&frame, 4, 2, 2), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 4, 0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn outline_leaves_interior_untouched() {
        let mut frame = vec![0u8; 5 * 5 * 4];

        outline_rect_clipped(&mut frame, 5, 5, &Rect::new(0.0, 0.0, 5.0, 5.0), RED);

        assert_eq!(pixel(&frame, 5, 0, 0), RED);
        assert_eq!(pixel(&frame, 5, 4, 4), RED);
        assert_eq!(pixel(&frame, 5, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn writes_past_row_end_do_not_wrap() {
        let mut frame = vec![0u8; 2 * 2 * 4];

        write_pixel_rgba_clipped(&mut frame, 2, 2, 0, RED);

        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn clear_resets_commands() {
        let mut list = DrawList::default();
        list.fill(Rect::new(0.0, 0.0, 1.0, 1.0), RED);

        list.clear([1, 2, 3, 255]);

        assert!(list.commands().is_empty());
        assert_eq!(list.clear_color(), [1, 2, 3, 255]);
    }
}
