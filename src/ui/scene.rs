//! 3-D scene: a unit cube sliding along the x axis, seen through a
//! perspective camera and drawn with the imgui window draw list.

use crate::playback::SceneView;
use imgui::{StyleColor, Ui};

/// Corner pairs forming the twelve cube edges
const EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Corners of the face pointing at the camera (+z)
const FRONT_FACE: [usize; 4] = [4, 5, 6, 7];

/// Perspective camera looking down -z at the origin
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub z: f64,
    pub fov_y_deg: f64,
    pub near: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            z: 80.0,
            fov_y_deg: 75.0,
            near: 0.1,
        }
    }
}

impl Camera {
    /// Project a world point into a viewport, `None` when behind the near plane
    pub fn project(&self, point: [f64; 3], origin: [f32; 2], size: [f32; 2]) -> Option<[f32; 2]> {
        let depth = self.z - point[2];
        if depth <= self.near {
            return None;
        }
        let focal = (size[1] as f64 / 2.0) / (self.fov_y_deg.to_radians() / 2.0).tan();
        let cx = origin[0] as f64 + size[0] as f64 / 2.0;
        let cy = origin[1] as f64 + size[1] as f64 / 2.0;
        Some([
            (cx + point[0] * focal / depth) as f32,
            (cy - point[1] * focal / depth) as f32,
        ])
    }
}

pub struct CubeScene {
    camera: Camera,
    cube_size: f64,
    color: [f32; 4],
    object_x: f64,
    /// Set by `request_render()`; the cube is reprojected on the next draw
    render_pending: bool,
    /// Screen-space corners and the viewport `(origin, size)` they were projected for
    projected: [Option<[f32; 2]>; 8],
    viewport: Option<([f32; 2], [f32; 2])>,
}

impl CubeScene {
    pub fn new() -> Self {
        Self {
            camera: Camera::default(),
            cube_size: 1.0,
            color: [0.0, 1.0, 0.0, 1.0],
            object_x: 0.0,
            render_pending: false,
            projected: [None; 8],
            viewport: None,
        }
    }

    /// World-space corners; 0..4 on the back face, 4..8 on the front
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let h = self.cube_size / 2.0;
        let x = self.object_x;
        [
            [x - h, -h, -h], [x + h, -h, -h], [x + h, h, -h], [x - h, h, -h],
            [x - h, -h, h], [x + h, -h, h], [x + h, h, h], [x - h, h, h],
        ]
    }

    /// Reproject the cube when a render was requested or the viewport moved.
    /// Returns whether the projection was recomputed.
    fn prepare_projection(&mut self, origin: [f32; 2], size: [f32; 2]) -> bool {
        if !self.render_pending && self.viewport == Some((origin, size)) {
            return false;
        }
        let camera = self.camera;
        self.projected = self.corners().map(|c| camera.project(c, origin, size));
        self.viewport = Some((origin, size));
        self.render_pending = false;
        true
    }

    pub fn render(&mut self, ui: &Ui) {
        let avail = ui.content_region_avail();
        let size = [avail[0].max(50.0), (avail[1] - 22.0).max(80.0)];
        let origin = ui.cursor_screen_pos();
        let max = [origin[0] + size[0], origin[1] + size[1]];
        self.prepare_projection(origin, size);

        {
            let draw_list = ui.get_window_draw_list();
            draw_list.add_rect(origin, max, ui.style_color(StyleColor::WindowBg))
                .filled(true)
                .build();

            // Travel axis with a tick every 10 units
            let axis = (
                self.camera.project([-25.0, -1.0, 0.0], origin, size),
                self.camera.project([25.0, -1.0, 0.0], origin, size),
            );
            if let (Some(a), Some(b)) = axis {
                draw_list.add_line(a, b, [0.5, 0.5, 0.5, 0.5]).build();
            }
            for tick in [-20.0, -10.0, 0.0, 10.0, 20.0] {
                if let Some(p) = self.camera.project([tick, -1.0, 0.0], origin, size) {
                    draw_list.add_line([p[0], p[1] - 3.0], [p[0], p[1] + 3.0], [0.5, 0.5, 0.5, 0.8]).build();
                    draw_list.add_text([p[0] - 6.0, p[1] + 5.0], [0.6, 0.6, 0.6, 0.8], format!("{:.0}", tick));
                }
            }

            let projected = self.projected;
            if let [Some(a), Some(b), Some(c), Some(d)] = FRONT_FACE.map(|i| projected[i]) {
                draw_list.add_triangle(a, b, c, self.color).filled(true).build();
                draw_list.add_triangle(a, c, d, self.color).filled(true).build();
            }

            let edge_color = [self.color[0] * 0.5, self.color[1] * 0.5, self.color[2] * 0.5, 1.0];
            for (i, j) in EDGES {
                if let (Some(a), Some(b)) = (projected[i], projected[j]) {
                    draw_list.add_line(a, b, edge_color).build();
                }
            }
        }

        ui.dummy(size);
        ui.text(format!("x = {:.2}", self.object_x));
    }
}

impl Default for CubeScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneView for CubeScene {
    fn set_object_position(&mut self, x: f64) {
        self.object_x = x;
    }

    fn request_render(&mut self) {
        self.render_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: [f32; 2] = [0.0, 0.0];
    const SIZE: [f32; 2] = [800.0, 600.0];

    #[test]
    fn test_origin_projects_to_viewport_center() {
        let camera = Camera::default();
        assert_eq!(camera.project([0.0, 0.0, 0.0], ORIGIN, SIZE), Some([400.0, 300.0]));
    }

    #[test]
    fn test_projection_direction() {
        let camera = Camera::default();
        let right = camera.project([20.0, 0.0, 0.0], ORIGIN, SIZE).unwrap();
        let up = camera.project([0.0, 5.0, 0.0], ORIGIN, SIZE).unwrap();
        assert!(right[0] > 400.0);
        assert!(up[1] < 300.0);
    }

    #[test]
    fn test_closer_points_spread_further() {
        let camera = Camera::default();
        let far = camera.project([1.0, 0.0, 0.0], ORIGIN, SIZE).unwrap();
        let near = camera.project([1.0, 0.0, 40.0], ORIGIN, SIZE).unwrap();
        assert!(near[0] > far[0]);
    }

    #[test]
    fn test_point_behind_camera_is_culled() {
        let camera = Camera::default();
        assert!(camera.project([0.0, 0.0, 80.0], ORIGIN, SIZE).is_none());
        assert!(camera.project([0.0, 0.0, 100.0], ORIGIN, SIZE).is_none());
    }

    #[test]
    fn test_corners_follow_object() {
        let mut scene = CubeScene::new();
        scene.set_object_position(10.0);
        let corners = scene.corners();
        assert_eq!(scene.object_x, 10.0);
        assert!(corners.iter().all(|c| (c[0] - 10.0).abs() <= 0.5));
        assert!(FRONT_FACE.iter().all(|&i| corners[i][2] > 0.0));
    }

    #[test]
    fn test_first_draw_projects_cube() {
        let mut scene = CubeScene::new();
        assert!(scene.prepare_projection(ORIGIN, SIZE));
        assert!(scene.projected.iter().all(Option::is_some));
        assert!(!scene.prepare_projection(ORIGIN, SIZE));
    }

    #[test]
    fn test_request_render_reprojects_moved_cube() {
        let mut scene = CubeScene::new();
        scene.prepare_projection(ORIGIN, SIZE);
        let before = scene.projected;

        // Moving without a render request keeps the last frame
        scene.set_object_position(10.0);
        assert!(!scene.prepare_projection(ORIGIN, SIZE));
        assert_eq!(scene.projected, before);

        scene.request_render();
        assert!(scene.render_pending);
        assert!(scene.prepare_projection(ORIGIN, SIZE));
        assert!(!scene.render_pending);
        let shifted = scene.projected[4].unwrap()[0] - before[4].unwrap()[0];
        assert!(shifted > 0.0);
    }

    #[test]
    fn test_viewport_change_reprojects() {
        let mut scene = CubeScene::new();
        scene.prepare_projection(ORIGIN, SIZE);
        assert!(scene.prepare_projection(ORIGIN, [400.0, 300.0]));
        assert!(scene.prepare_projection([10.0, 10.0], [400.0, 300.0]));
    }
}
