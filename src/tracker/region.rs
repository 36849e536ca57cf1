/// Tracked object location: top-left corner plus size, in pixels.
///
/// The seed taken from the ground truth, every tracker estimate and every
/// line of the result log are all `Region`s. Nothing constrains it to the
/// frame; a tracker may report a region partly or fully outside the image.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    /// Region from its top-left corner and size.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region of the given size centered on `(cx, cy)`.
    #[inline]
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// `width / height`, or 0 for a flat region.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        }
    }

    /// Same center, both sides multiplied by `factor`. Used to pad a
    /// region with context before sampling around it.
    pub fn scaled(&self, factor: f32) -> Region {
        let (cx, cy) = self.center();
        Region::centered(cx, cy, self.width * factor, self.height * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_matches_center() {
        let region = Region::centered(25.0, 40.0, 30.0, 40.0);
        assert_eq!(region, Region::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(region.center(), (25.0, 40.0));
    }

    #[test]
    fn test_aspect_ratio_of_flat_region() {
        assert!((Region::new(0.0, 0.0, 30.0, 40.0).aspect_ratio() - 0.75).abs() < 1e-6);
        assert_eq!(Region::new(0.0, 0.0, 30.0, 0.0).aspect_ratio(), 0.0);
    }

    #[test]
    fn test_scaled_keeps_center() {
        let region = Region::new(10.0, 10.0, 20.0, 40.0).scaled(0.5);
        assert_eq!(region.center(), (20.0, 30.0));
        assert_eq!(region.width, 10.0);
        assert_eq!(region.height, 20.0);
    }
}
