//! First-person maze flythrough with audio-pulsed walls.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;
use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const MAZE_SIZE: usize = 32;
const CELL_SIZE: f32 = 0.8;
const WALL_HEIGHT: f32 = 1.5;
const MOVE_SPEED: f32 = 1.5;
const PULSE_INTENSITY: f32 = 0.3;

const WALL_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const FLOOR_COLOR: Color = Color::rgb(0.0, 0.3, 0.0);
const CEILING_COLOR: Color = Color::rgb(0.0, 0.5, 0.0);
const GLOW_COLOR: Color = Color::rgb(0.2, 1.0, 0.2);

const RNG_SEED: u64 = 0x3a2e;

#[derive(Clone, Copy)]
struct MazeCell {
    has_wall: bool,
    height: f32,
    glow: f32,
}

/// Camera gliding through a generated maze whose walls pulse with the
/// music.
pub struct MazeVisualizer {
    aspect: f32,
    audio_amplitude: f32,
    maze_position: f32,
    maze: Vec<Vec<MazeCell>>,
}

impl MazeVisualizer {
    /// Generates the maze (fixed seed, so every run walks the same one).
    pub fn new() -> Self {
        Self {
            aspect: 4.0 / 3.0,
            audio_amplitude: 0.0,
            maze_position: 0.0,
            maze: generate_maze(&mut StdRng::seed_from_u64(RNG_SEED)),
        }
    }

    /// Captures the aspect ratio for the perspective camera.
    pub fn initialize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Offline entry point.
    pub fn render_frame(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        self.render(canvas, input);
    }

    /// Live entry point.
    pub fn render_live(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        self.render(canvas, input);
    }

    fn render(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        canvas.begin_frame(Color::BLACK);

        self.audio_amplitude = (input.primary().amplitude * 5.0).min(1.0);

        let dt = input.dt.max(1.0 / 240.0);
        self.maze_position -= dt * MOVE_SPEED;
        self.update_walls();

        let camera = self.camera();
        self.draw_floor_and_ceiling(canvas, &camera);
        self.draw_walls(canvas, &camera);
        self.draw_path_line(canvas, &camera);
    }

    fn update_walls(&mut self) {
        let amplitude = self.audio_amplitude;
        let position = self.maze_position;
        for (x, column) in self.maze.iter_mut().enumerate() {
            for (z, cell) in column.iter_mut().enumerate() {
                if !cell.has_wall {
                    continue;
                }
                let pulse = ((x + z) as f32 * 0.5 + position * 0.1).sin();
                cell.height = WALL_HEIGHT * (1.0 + amplitude * PULSE_INTENSITY * pulse);
                cell.glow = amplitude * (0.5 + 0.5 * (position * 0.2 + (x + z) as f32).sin());
            }
        }
    }

    /// Finds the open corridor column at the camera's row.
    fn corridor_x(&self, world_z: f32) -> f32 {
        let maze_z = ((world_z / CELL_SIZE) + MAZE_SIZE as f32 / 2.0) as isize;
        let maze_z = maze_z.rem_euclid(MAZE_SIZE as isize) as usize;
        for x in 1..MAZE_SIZE - 1 {
            if !self.maze[x][maze_z].has_wall {
                return (x as f32 - MAZE_SIZE as f32 / 2.0) * CELL_SIZE;
            }
        }
        0.0
    }

    fn camera(&self) -> Camera {
        let camera_x = self.corridor_x(self.maze_position);
        // Eye level with a slight audio bob.
        let eye = Vec3::new(
            camera_x,
            0.4 + self.audio_amplitude * 0.1,
            self.maze_position,
        );
        let target = Vec3::new(camera_x, 0.4, self.maze_position - 2.0);
        Camera::perspective(75.0, self.aspect, eye, target, Vec3::Y)
    }

    fn draw_walls(&self, canvas: &mut Canvas, camera: &Camera) {
        let width = 2.0 + self.audio_amplitude * 3.0;
        let half = CELL_SIZE * 0.5;

        for (x, column) in self.maze.iter().enumerate() {
            for (z, cell) in column.iter().enumerate() {
                if !cell.has_wall {
                    continue;
                }
                let world_x = (x as f32 - MAZE_SIZE as f32 / 2.0) * CELL_SIZE;
                let world_z = (z as f32 - MAZE_SIZE as f32 / 2.0) * CELL_SIZE + self.maze_position;

                // Cull cells outside the visible corridor stretch.
                if world_z < self.maze_position - 20.0 || world_z > self.maze_position + 20.0 {
                    continue;
                }

                let color = WALL_COLOR.scaled(0.5 + cell.glow * 0.5);
                let height = cell.height;

                let corners = |y: f32| {
                    [
                        Vec3::new(world_x - half, y, world_z - half),
                        Vec3::new(world_x + half, y, world_z - half),
                        Vec3::new(world_x + half, y, world_z + half),
                        Vec3::new(world_x - half, y, world_z + half),
                    ]
                };
                let bottom = corners(0.0);
                let top = corners(height);

                let mut segments: Vec<(Vec2, Vec2)> = Vec::with_capacity(14);
                for i in 0..4 {
                    let j = (i + 1) % 4;
                    // Bottom and top outlines plus the vertical edges.
                    for (a, b) in [
                        (bottom[i], bottom[j]),
                        (top[i], top[j]),
                        (bottom[i], top[i]),
                    ] {
                        if let Some(seg) = camera.project_segment(a, b) {
                            segments.push(seg);
                        }
                    }
                }
                // Cross detail on the front face.
                for (a, b) in [
                    (
                        Vec3::new(world_x - half, height * 0.5, world_z - half),
                        Vec3::new(world_x + half, height * 0.5, world_z - half),
                    ),
                    (
                        Vec3::new(world_x, 0.0, world_z - half),
                        Vec3::new(world_x, height, world_z - half),
                    ),
                ] {
                    if let Some(seg) = camera.project_segment(a, b) {
                        segments.push(seg);
                    }
                }
                canvas.lines(&segments, color, width);
            }
        }
    }

    fn draw_floor_and_ceiling(&self, canvas: &mut Canvas, camera: &Camera) {
        let grid_size = MAZE_SIZE as f32 * CELL_SIZE;
        let near = self.maze_position + 20.0;
        let far = self.maze_position - 20.0;

        let mut floor: Vec<(Vec2, Vec2)> = Vec::new();
        let mut x = -grid_size;
        while x <= grid_size {
            if let Some(seg) =
                camera.project_segment(Vec3::new(x, 0.0, far), Vec3::new(x, 0.0, near))
            {
                floor.push(seg);
            }
            x += CELL_SIZE;
        }
        let mut z = far;
        while z <= near {
            if let Some(seg) = camera
                .project_segment(Vec3::new(-grid_size, 0.0, z), Vec3::new(grid_size, 0.0, z))
            {
                floor.push(seg);
            }
            z += CELL_SIZE;
        }
        canvas.lines(&floor, FLOOR_COLOR, 1.0);

        let ceiling_height = 3.0 + self.audio_amplitude * 0.5;
        let mut ceiling: Vec<(Vec2, Vec2)> = Vec::new();
        let mut x = -grid_size;
        while x <= grid_size {
            if let Some(seg) = camera.project_segment(
                Vec3::new(x, ceiling_height, far),
                Vec3::new(x, ceiling_height, near),
            ) {
                ceiling.push(seg);
            }
            x += CELL_SIZE * 2.0;
        }
        let mut z = far;
        while z <= near {
            if let Some(seg) = camera.project_segment(
                Vec3::new(-grid_size, ceiling_height, z),
                Vec3::new(grid_size, ceiling_height, z),
            ) {
                ceiling.push(seg);
            }
            z += CELL_SIZE * 2.0;
        }
        canvas.lines(&ceiling, CEILING_COLOR, 1.0);
    }

    fn draw_path_line(&self, canvas: &mut Canvas, camera: &Camera) {
        let color = GLOW_COLOR.scaled(0.5 + self.audio_amplitude * 0.5);
        let width = 2.0 + self.audio_amplitude * 3.0;

        let mut path: Vec<Vec3> = Vec::new();
        let mut z = self.maze_position - 15.0;
        while z <= self.maze_position + 5.0 {
            path.push(Vec3::new(self.corridor_x(z - self.maze_position), 0.05, z));
            z += 0.5;
        }
        let projected = camera.project_polyline(&path);
        canvas.line_strip(&projected, color, width);
    }
}

impl Default for MazeVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursive-backtracking maze over a grid of wall cells, with a few
/// extra openings knocked through and the outer ring kept solid.
fn generate_maze(rng: &mut StdRng) -> Vec<Vec<MazeCell>> {
    let wall = MazeCell {
        has_wall: true,
        height: WALL_HEIGHT,
        glow: 0.5,
    };
    let open = MazeCell {
        has_wall: false,
        height: 0.0,
        glow: 0.5,
    };

    let mut maze = vec![vec![wall; MAZE_SIZE]; MAZE_SIZE];
    let mut visited = vec![vec![false; MAZE_SIZE]; MAZE_SIZE];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    // Start from odd center coordinates so corridors stay one cell wide.
    let mut start_x = MAZE_SIZE / 2;
    let mut start_z = MAZE_SIZE / 2;
    if start_x % 2 == 0 {
        start_x += 1;
    }
    if start_z % 2 == 0 {
        start_z += 1;
    }

    maze[start_x][start_z] = open;
    visited[start_x][start_z] = true;
    stack.push((start_x, start_z));

    const DX: [isize; 4] = [0, 0, 2, -2];
    const DZ: [isize; 4] = [-2, 2, 0, 0];

    while let Some(&(cx, cz)) = stack.last() {
        let neighbors: Vec<usize> = (0..4)
            .filter(|&dir| {
                let nx = cx as isize + DX[dir];
                let nz = cz as isize + DZ[dir];
                nx > 0
                    && (nx as usize) < MAZE_SIZE - 1
                    && nz > 0
                    && (nz as usize) < MAZE_SIZE - 1
                    && !visited[nx as usize][nz as usize]
            })
            .collect();

        if neighbors.is_empty() {
            stack.pop();
            continue;
        }

        let dir = neighbors[rng.random_range(0..neighbors.len())];
        let nx = (cx as isize + DX[dir]) as usize;
        let nz = (cz as isize + DZ[dir]) as usize;
        let wx = (cx as isize + DX[dir] / 2) as usize;
        let wz = (cz as isize + DZ[dir] / 2) as usize;

        maze[nx][nz] = open;
        maze[wx][wz] = open;
        visited[nx][nz] = true;
        stack.push((nx, nz));
    }

    // Knock a few random openings through to break up dead ends.
    for x in 1..MAZE_SIZE - 1 {
        for z in 1..MAZE_SIZE - 1 {
            if maze[x][z].has_wall && rng.random::<f32>() < 0.05 {
                let path_neighbors = [!maze[x - 1][z].has_wall, !maze[x + 1][z].has_wall]
                    .into_iter()
                    .chain([!maze[x][z - 1].has_wall, !maze[x][z + 1].has_wall])
                    .filter(|&p| p)
                    .count();
                if path_neighbors >= 2 {
                    maze[x][z] = open;
                }
            }
        }
    }

    for i in 0..MAZE_SIZE {
        maze[0][i] = wall;
        maze[MAZE_SIZE - 1][i] = wall;
        maze[i][0] = wall;
        maze[i][MAZE_SIZE - 1] = wall;
    }

    maze
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    #[test]
    fn generated_maze_has_corridors_and_solid_border() {
        let maze = generate_maze(&mut StdRng::seed_from_u64(RNG_SEED));
        let open_cells: usize = maze
            .iter()
            .flatten()
            .filter(|cell| !cell.has_wall)
            .count();
        assert!(open_cells > MAZE_SIZE, "maze has no corridors");

        for i in 0..MAZE_SIZE {
            assert!(maze[0][i].has_wall);
            assert!(maze[MAZE_SIZE - 1][i].has_wall);
            assert!(maze[i][0].has_wall);
            assert!(maze[i][MAZE_SIZE - 1].has_wall);
        }
    }

    #[test]
    fn maze_generation_is_seeded() {
        let a = generate_maze(&mut StdRng::seed_from_u64(RNG_SEED));
        let b = generate_maze(&mut StdRng::seed_from_u64(RNG_SEED));
        for x in 0..MAZE_SIZE {
            for z in 0..MAZE_SIZE {
                assert_eq!(a[x][z].has_wall, b[x][z].has_wall);
            }
        }
    }

    #[test]
    fn renders_without_panic() {
        let sources = [SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.0; 1024],
            amplitude: 0.2,
        }];
        let mut style = MazeVisualizer::new();
        style.initialize(800, 600);
        let mut canvas = Canvas::new(800, 600);
        for frame in 0..10 {
            style.render_frame(
                &mut canvas,
                &FrameInput {
                    sources: &sources,
                    time: frame as f32 / 30.0,
                    dt: 1.0 / 30.0,
                    cursor: 0,
                },
            );
        }
        assert!(!canvas.ops().is_empty());
    }
}
