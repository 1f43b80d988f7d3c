//! Meshes of the unit interval.
use crate::element::SegmentElement;
use crate::Error;

/// A partition of $[0, 1]$ into contiguous, non-overlapping segments.
///
/// A mesh with *resolution* $N$ has $N + 1$ elements and $N + 2$ vertices. Vertices are stored
/// in strictly increasing order, with the first vertex at $0$ and the last at $1$.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh1d {
    vertices: Vec<f64>,
}

impl Mesh1d {
    /// Creates a uniform mesh with $N + 1$ elements of size $h = 1 / (N + 1)$.
    pub fn uniform(resolution: usize) -> Result<Self, Error> {
        if resolution < 1 {
            return Err(Error::configuration(format!(
                "Mesh resolution must be at least 1, got {}",
                resolution
            )));
        }

        let num_elements = resolution + 1;
        let h = 1.0 / num_elements as f64;
        // Compute each vertex directly rather than accumulating h, and pin the last vertex to 1
        let vertices = (0..=num_elements)
            .map(|i| if i == num_elements { 1.0 } else { i as f64 * h })
            .collect();
        Ok(Self { vertices })
    }

    /// Creates a mesh from user-specified vertices.
    ///
    /// The vertices must be finite, strictly increasing, start at $0$, end at $1$ and define
    /// at least two elements.
    pub fn from_vertices(vertices: Vec<f64>) -> Result<Self, Error> {
        if vertices.len() < 3 {
            return Err(Error::configuration(format!(
                "A mesh needs at least 3 vertices (2 elements), got {}",
                vertices.len()
            )));
        }
        if let Some(v) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(Error::configuration(format!("Mesh vertex {} is not finite", v)));
        }
        if vertices[0] != 0.0 || vertices[vertices.len() - 1] != 1.0 {
            return Err(Error::configuration(
                "Mesh vertices must start at 0 and end at 1",
            ));
        }
        if let Some(i) = vertices.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(Error::configuration(format!(
                "Mesh vertices must be strictly increasing, but vertex {} ({}) does not exceed vertex {} ({})",
                i + 1,
                vertices[i + 1],
                i,
                vertices[i]
            )));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_elements(&self) -> usize {
        self.vertices.len() - 1
    }

    /// The resolution $N$, i.e. the number of elements minus one.
    pub fn resolution(&self) -> usize {
        self.num_elements() - 1
    }

    /// Returns the element with the given index, or `None` if the index is out of bounds.
    pub fn element(&self, element_index: usize) -> Option<SegmentElement> {
        let a = *self.vertices.get(element_index)?;
        let b = *self.vertices.get(element_index + 1)?;
        Some(SegmentElement::from_interval([a, b]))
    }

    pub fn elements(&self) -> impl '_ + ExactSizeIterator<Item = SegmentElement> {
        self.vertices
            .windows(2)
            .map(|pair| SegmentElement::from_interval([pair[0], pair[1]]))
    }

    /// The size of the largest element.
    pub fn max_element_size(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .fold(0.0, f64::max)
    }

    /// Locates the element containing `x`.
    ///
    /// Points on an interior vertex are attributed to the element on the right, except for
    /// $x = 1$, which belongs to the last element. Returns `None` for points outside $[0, 1]$.
    pub fn find_element(&self, x: f64) -> Option<usize> {
        if !(0.0..=1.0).contains(&x) {
            return None;
        }
        // Number of vertices that are <= x, which is at least 1 since the first vertex is 0
        let num_vertices_left = self.vertices.partition_point(|&v| v <= x);
        Some(usize::min(num_vertices_left - 1, self.num_elements() - 1))
    }
}
