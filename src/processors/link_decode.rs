//! Region decoding from detector score maps.
//!
//! The detector emits two score maps per frame: per-cell text confidence and
//! per-cell link confidence toward each neighbor direction. Decoding is a
//! two-stage threshold followed by connectivity: cells are admitted as text
//! pixels when their text score passes the text threshold, and two admitted
//! neighbors are merged into the same component when the link score between
//! them passes the link threshold. Each component is rescaled to image
//! coordinates by the map stride and reduced to a minimum-area oriented
//! rectangle. Both thresholds are inclusive.
//!
//! Connectivity is computed with a disjoint set over grid indices rather than
//! a recursive flood fill, so stack depth stays bounded on large maps.

use crate::core::config::Connectivity;
use crate::core::errors::{SpotError, SpotResult};
use crate::core::traits::DetectionMaps;
use crate::processors::geometry::{OrientedRect, Point};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::debug;

/// A disjoint set over grid indices, stored as an arena of parent links.
struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
        }
    }

    /// Finds the root of `i` with path halving.
    fn find(&mut self, mut i: u32) -> u32 {
        while self.parent[i as usize] != i {
            let grandparent = self.parent[self.parent[i as usize] as usize];
            self.parent[i as usize] = grandparent;
            i = grandparent;
        }
        i
    }

    fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent[root_b as usize] = root_a;
        }
    }
}

/// Decodes detector score maps into oriented text regions.
#[derive(Debug, Clone)]
pub struct RegionDecoder {
    /// Minimum text-pixel score for cell admission. Inclusive.
    text_threshold: f32,
    /// Minimum link score for edge admission between admitted cells.
    /// Inclusive.
    link_threshold: f32,
    /// Neighbor connectivity of the link maps.
    connectivity: Connectivity,
}

impl RegionDecoder {
    /// Creates a new region decoder.
    pub fn new(text_threshold: f32, link_threshold: f32, connectivity: Connectivity) -> Self {
        Self {
            text_threshold,
            link_threshold,
            connectivity,
        }
    }

    /// Decodes score maps into oriented rectangles in original-image pixel
    /// coordinates.
    ///
    /// `image_size` is the (width, height) of the original frame; map cells
    /// are rescaled to image coordinates by the implied per-axis stride.
    /// Degenerate components (empty or collapsing to zero area) are dropped.
    /// Components touching the map border are kept.
    ///
    /// # Errors
    ///
    /// Returns [`SpotError::Config`] when the link map channel count does not
    /// match the configured connectivity, or when the link and text maps
    /// disagree on spatial resolution; both indicate a detector/configuration
    /// mismatch.
    pub fn decode(&self, maps: &DetectionMaps, image_size: (u32, u32)) -> SpotResult<Vec<OrientedRect>> {
        let (map_h, map_w) = maps.map_size();
        let offsets = self.connectivity.offsets();

        let link_shape = maps.links.shape();
        if link_shape[0] != offsets.len() {
            return Err(SpotError::config(format!(
                "link map has {} direction channels, connectivity expects {}",
                link_shape[0],
                offsets.len()
            )));
        }
        if link_shape[1] != map_h || link_shape[2] != map_w {
            return Err(SpotError::config(format!(
                "link map resolution {}x{} does not match text map {}x{}",
                link_shape[2], link_shape[1], map_w, map_h
            )));
        }

        if map_h == 0 || map_w == 0 {
            return Ok(Vec::new());
        }

        // Stage 1: node admission by text score.
        let mut admitted = vec![false; map_h * map_w];
        for y in 0..map_h {
            for x in 0..map_w {
                admitted[y * map_w + x] = maps.text[[y, x]] >= self.text_threshold;
            }
        }

        // Stage 2: edge admission by link score, merged via disjoint set.
        let mut components = DisjointSet::new(map_h * map_w);
        for y in 0..map_h {
            for x in 0..map_w {
                let idx = y * map_w + x;
                if !admitted[idx] {
                    continue;
                }
                for (dir, &(dx, dy)) in offsets.iter().enumerate() {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= map_w as i32 || ny >= map_h as i32 {
                        continue;
                    }
                    let neighbor = ny as usize * map_w + nx as usize;
                    if !admitted[neighbor] {
                        continue;
                    }
                    if maps.links[[dir, y, x]] >= self.link_threshold {
                        components.union(idx as u32, neighbor as u32);
                    }
                }
            }
        }

        // Collect component pixels, rescaled to image coordinates.
        let scale_x = image_size.0 as f32 / map_w as f32;
        let scale_y = image_size.1 as f32 / map_h as f32;

        let pixels_by_root: HashMap<u32, Vec<Point>> = (0..map_h * map_w)
            .filter(|&idx| admitted[idx])
            .map(|idx| {
                let point = Point::new(
                    (idx % map_w) as f32 * scale_x,
                    (idx / map_w) as f32 * scale_y,
                );
                (components.find(idx as u32), point)
            })
            .into_group_map();

        let component_count = pixels_by_root.len();
        let mut regions: Vec<OrientedRect> = pixels_by_root
            .into_values()
            .map(|pixels| OrientedRect::enclosing(&pixels))
            .filter(|rect| !rect.is_degenerate())
            .collect();

        // HashMap iteration order is unspecified; keep output deterministic.
        regions.sort_by(|a, b| {
            (a.center.y, a.center.x)
                .partial_cmp(&(b.center.y, b.center.x))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            "region decode: {} admitted components, {} non-degenerate regions",
            component_count,
            regions.len()
        );

        Ok(regions)
    }
}
