use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box in page pixel coordinates.
///
/// `min` is the top-left corner `(x1, y1)` and `max` the bottom-right corner
/// `(x2, y2)`; image coordinates grow to the right and downward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    /// The top-left corner `(x1, y1)`.
    pub min: Vec2,
    /// The bottom-right corner `(x2, y2)`.
    pub max: Vec2,
}

impl Bbox {
    /// Creates a new bounding box from minimum and maximum points.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use paperseg_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
    /// assert_eq!(bbox.width(), 10.0);
    /// ```
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from the detector's `(x1, y1, x2, y2)` tuple layout.
    ///
    /// # Example
    /// ```
    /// use paperseg_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_xyxy(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(bbox.height(), 50.0);
    /// ```
    pub fn from_xyxy(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    /// Creates a new bounding box from a center point and size vector.
    ///
    /// This constructor is used with YOLO-style detection outputs where
    /// bounding boxes are represented as (center_x, center_y, width, height).
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use paperseg_core::analysis::bbox::Bbox;
    /// // Create a bbox centered at (100, 200) with size 50x80
    /// let bbox = Bbox::from_center_size(Vec2::new(100.0, 200.0), Vec2::new(50.0, 80.0));
    /// assert_eq!(bbox.min, Vec2::new(75.0, 160.0));
    /// assert_eq!(bbox.max, Vec2::new(125.0, 240.0));
    /// ```
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half_size = size / 2.0;
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Calculates the area of the bounding box (width × height).
    ///
    /// # Example
    /// ```
    /// use paperseg_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_xyxy(0.0, 0.0, 4.0, 3.0);
    /// assert_eq!(bbox.area(), 12.0);
    /// ```
    pub fn area(&self) -> f32 {
        let length = self.max - self.min;

        length.x * length.y
    }

    /// Calculates the center point of the bounding box.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Calculates the area of intersection between this bounding box and another.
    ///
    /// Returns 0.0 when the boxes do not overlap or only touch at an edge.
    ///
    /// # Example
    /// ```
    /// use paperseg_core::analysis::bbox::Bbox;
    /// let bbox1 = Bbox::from_xyxy(0.0, 0.0, 4.0, 4.0);
    /// let bbox2 = Bbox::from_xyxy(2.0, 2.0, 6.0, 6.0);
    /// assert_eq!(bbox1.intersection(&bbox2), 4.0); // 2x2 intersection area
    /// ```
    pub fn intersection(&self, other: &Self) -> f32 {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);

        if max.x > min.x && max.y > min.y {
            (max.x - min.x) * (max.y - min.y)
        } else {
            0.
        }
    }

    /// Calculates the overlap ratio using the smaller area as denominator.
    ///
    /// A small box fully inside a large one yields 1.0.
    ///
    /// # Example
    /// ```
    /// use paperseg_core::analysis::bbox::Bbox;
    ///
    /// let large = Bbox::from_xyxy(0.0, 0.0, 100.0, 100.0);
    /// let small = Bbox::from_xyxy(10.0, 10.0, 30.0, 30.0);
    ///
    /// assert_eq!(large.overlap_ratio(&small), 1.0);
    /// ```
    pub fn overlap_ratio(&self, other: &Self) -> f32 {
        let intersection_area = self.intersection(other);
        let min_area = self.area().min(other.area());

        if min_area > 0.0 {
            intersection_area / min_area
        } else {
            0.0
        }
    }

    /// Creates the smallest bounding box that encompasses both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Clamps the bounding box coordinates to stay within the specified bounds.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use paperseg_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(-10.0, -5.0), Vec2::new(1030.0, 1030.0));
    /// let clamped = bbox.clamp(Vec2::new(0.0, 0.0), Vec2::new(1023.0, 1023.0));
    /// assert_eq!(clamped.min, Vec2::new(0.0, 0.0));
    /// assert_eq!(clamped.max, Vec2::new(1023.0, 1023.0));
    /// ```
    pub fn clamp(&self, min_bounds: Vec2, max_bounds: Vec2) -> Self {
        Self {
            min: self.min.max(min_bounds),
            max: self.max.min(max_bounds),
        }
    }

    /// Multiplies both corners by `factor`.
    ///
    /// Used to move detections from model-input space back to page pixels.
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }
}
