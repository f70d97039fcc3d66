//! Scene description format.
//!
//! ```text
//! size 320 180
//! ambient 0.1
//! light (0, 5, 0)
//! sphere (0, 0, -2) 0.5 red metal: reflectivity 0.6
//! triangle (-1, -1, -3) (1, -1, -3) (0, 1, -3) (0.2, 0.8, 0.2) kd 0.7 ks 0.3
//! plane (0, -1, 0) (0, 1, 0) white
//! model "teapot.obj" orange plastic: > scale 0.5 > rotate (0, 1, 0) 45 > translate (0, 0, -4)
//! ```
//!
//! `#` starts a comment that runs to the end of the line. Rotation angles
//! are in degrees.

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use super::{
    core::{Light, Material, Scene, SceneObject, DEFAULT_AMBIENT},
    model,
    solid::{Plane, Solid, Sphere, Triangle},
    Color, Mat4, Vec3,
};

pub struct SceneParser {
    content: Vec<char>,
    buffer: String,
    position: FilePosition,
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePosition {
    pub line: u32,
    pub column: u32,
    index: u32,
}

impl FilePosition {
    fn new() -> Self {
        FilePosition {
            line: 0,
            column: 0,
            index: 0,
        }
    }

    fn on_new_line(&mut self) {
        self.line += 1;
        self.column = 0;
        self.index += 1;
    }

    fn advance(&mut self) {
        self.column += 1;
        self.index += 1;
    }
}

#[derive(Debug, Error)]
#[error("{} at {}:{}", .message, .position.line + 1, .position.column + 1)]
pub struct ParserError {
    pub position: FilePosition,
    pub message: String,
}

impl ParserError {
    fn new(message: &str, position: FilePosition) -> ParserError {
        ParserError {
            position,
            message: message.to_string(),
        }
    }

    /// Print the message followed by the offending line with a caret
    /// under the column where parsing stopped.
    pub fn print_error_location(&self, content: &str) {
        eprintln!("{}", self);
        if let Some(line) = content.lines().nth(self.position.line as usize) {
            eprintln!("{}", line);
            let spacing = " ".repeat(self.position.column as usize);
            eprintln!("{}^", spacing);
        }
    }
}

type ParserResult<T> = Result<T, ParserError>;

/// Result of parsing a scene file: the resolution from the header and
/// the scene itself.
#[derive(Debug)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub scene: Scene,
}

impl SceneParser {
    pub fn new(content: &str) -> SceneParser {
        SceneParser {
            content: content.chars().collect(),
            position: FilePosition::new(),
            buffer: String::new(),
            base_dir: PathBuf::new(),
        }
    }

    /// Directory that relative model paths are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> SceneParser {
        self.base_dir = base_dir.as_ref().to_path_buf();
        self
    }

    fn get_current_char(&self) -> Option<char> {
        self.content.get(self.position.index as usize).copied()
    }

    fn is_empty(&mut self) -> bool {
        self.peek().is_empty()
    }

    fn advance(&mut self) -> bool {
        if let Some(current_char) = self.get_current_char() {
            if current_char == '\n' {
                self.position.on_new_line();
            } else {
                self.position.advance();
            }
            return true;
        }
        false
    }

    fn advance_until(&mut self, f: impl Fn(char) -> bool) {
        while let Some(current_char) = self.get_current_char() {
            if f(current_char) {
                break;
            }
            self.advance();
        }
    }

    fn eat_spaces(&mut self) {
        // consume all the empty lines, spaces and comments before the next token
        while let Some(current_char) = self.get_current_char() {
            if current_char == '#' {
                // the end-of-line itself is consumed at the bottom of the loop
                self.advance_until(|c| c == '\n');
            } else if !current_char.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    /// Push the current char onto `result`, advance, and return the next
    /// char (a space at the end of input).
    fn enqueue(&mut self, result: &mut String) -> char {
        if let Some(current_char) = self.get_current_char() {
            result.push(current_char);
            self.advance();
        }
        self.get_current_char().unwrap_or(' ')
    }

    fn pop(&mut self) -> String {
        // a previous peek already read the next token
        if !self.buffer.is_empty() {
            return std::mem::take(&mut self.buffer);
        }

        self.eat_spaces();
        let mut result = String::new();
        let Some(mut current_char) = self.get_current_char() else {
            return result;
        };

        match current_char {
            ',' | '(' | ')' | ':' | '>' => {
                self.advance();
                result.push(current_char);
            }
            '"' => {
                current_char = self.enqueue(&mut result);
                // no escapes
                while current_char != '"' && self.get_current_char().is_some() {
                    current_char = self.enqueue(&mut result);
                }
                self.enqueue(&mut result);
            }
            '.' | '+' | '-' | '0'..='9' => {
                if current_char == '+' || current_char == '-' {
                    current_char = self.enqueue(&mut result);
                }
                while current_char.is_ascii_digit() {
                    current_char = self.enqueue(&mut result);
                }
                if current_char == '.' {
                    current_char = self.enqueue(&mut result);
                    while current_char.is_ascii_digit() {
                        current_char = self.enqueue(&mut result);
                    }
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                while current_char.is_alphabetic() || current_char == '_' {
                    current_char = self.enqueue(&mut result);
                }
            }
            // anything else becomes a one-char token the grammar will reject
            _ => {
                self.advance();
                result.push(current_char);
            }
        }
        result
    }

    fn peek(&mut self) -> &String {
        if self.buffer.is_empty() {
            self.buffer = self.pop();
        }
        &self.buffer
    }

    fn error<T>(&self, message: &str) -> ParserResult<T> {
        Err(ParserError::new(message, self.position))
    }

    fn parse_float(&mut self) -> ParserResult<f64> {
        let next_token = self.pop();
        match next_token.parse::<f64>() {
            Ok(num) => Ok(num),
            Err(_) => self.error(&format!("cannot interpret '{}' as a number", next_token)),
        }
    }

    fn parse_positive(&mut self, what: &str) -> ParserResult<f64> {
        let value = self.parse_float()?;
        if value <= 0.0 {
            return self.error(&format!("{} must be positive, got {}", what, value));
        }
        Ok(value)
    }

    fn match_token(&mut self, expected_lexem: &str) -> ParserResult<()> {
        let next_lexem = self.pop();
        if next_lexem != expected_lexem {
            self.error(&format!(
                "expected '{}', getting '{}' instead",
                expected_lexem, next_lexem
            ))
        } else {
            Ok(())
        }
    }

    /// Consume the next lexem only if it equals `expected_lexem`.
    fn maybe_match(&mut self, expected_lexem: &str) -> bool {
        if *self.peek() == expected_lexem {
            self.pop();
            return true;
        }
        false
    }

    fn parse_header(&mut self) -> ParserResult<(u32, u32)> {
        self.match_token("size")?;
        let width = self.parse_positive("image width")?;
        let height = self.parse_positive("image height")?;
        Ok((width as u32, height as u32))
    }

    fn parse_vec3(&mut self) -> ParserResult<Vec3> {
        self.match_token("(")?;
        let x = self.parse_float()?;
        self.match_token(",")?;
        let y = self.parse_float()?;
        self.match_token(",")?;
        let z = self.parse_float()?;
        self.match_token(")")?;
        Ok(Vec3::new(x, y, z))
    }

    fn parse_direction(&mut self, what: &str) -> ParserResult<Vec3> {
        let v = self.parse_vec3()?;
        if v.try_normalize().is_err() {
            return self.error(&format!("{} cannot be a zero vector", what));
        }
        Ok(v)
    }

    fn parse_color(&mut self) -> ParserResult<Color> {
        const NAMED: [(&str, [f64; 3]); 11] = [
            ("red", [1.0, 0.0, 0.0]),
            ("blue", [0.0, 0.0, 1.0]),
            ("green", [0.0, 1.0, 0.0]),
            ("white", [1.0, 1.0, 1.0]),
            ("black", [0.0, 0.0, 0.0]),
            ("grey", [0.5, 0.5, 0.5]),
            ("cyan", [0.0, 1.0, 1.0]),
            ("violet", [1.0, 0.0, 1.0]),
            ("fuchsia", [0.96, 0.0, 0.96]),
            ("yellow", [1.0, 1.0, 0.0]),
            ("orange", [0.98, 0.45, 0.02]),
        ];
        for (name, rgb) in NAMED {
            if self.maybe_match(name) {
                return Ok(rgb.into());
            }
        }
        self.parse_vec3()
    }

    fn parse_material(&mut self) -> ParserResult<Material> {
        let mut material = Material::default();
        for (name, preset) in [
            ("metal", Material::metal()),
            ("plastic", Material::plastic()),
            ("mirror", Material::mirror()),
        ] {
            if self.maybe_match(name) {
                self.match_token(":")?;
                material = preset;
                break;
            }
        }

        loop {
            if self.maybe_match("albedo") {
                material.albedo = self.parse_float()?;
            } else if self.maybe_match("kd") {
                material.diffuse = self.parse_float()?;
            } else if self.maybe_match("ks") {
                material.specular = self.parse_float()?;
            } else if self.maybe_match("shininess") {
                material.shininess = self.parse_float()?;
            } else if self.maybe_match("reflectivity") {
                let reflectivity = self.parse_float()?;
                if !(0.0..=1.0).contains(&reflectivity) {
                    return self.error("reflectivity must be between 0 and 1");
                }
                material.reflectivity = reflectivity;
            } else {
                break;
            }
        }
        Ok(material)
    }

    fn parse_surface(&mut self, solid: impl Into<Solid>) -> ParserResult<SceneObject> {
        let color = self.parse_color()?;
        let material = self.parse_material()?;
        Ok(SceneObject::new(solid, color, material))
    }

    fn parse_sphere(&mut self) -> ParserResult<SceneObject> {
        self.match_token("sphere")?;
        let center = self.parse_vec3()?;
        let radius = self.parse_positive("sphere radius")?;
        self.parse_surface(Sphere::new(center, radius))
    }

    fn parse_triangle(&mut self) -> ParserResult<SceneObject> {
        self.match_token("triangle")?;
        let v0 = self.parse_vec3()?;
        let v1 = self.parse_vec3()?;
        let v2 = self.parse_vec3()?;
        let Ok(triangle) = Triangle::new(v0, v1, v2) else {
            return self.error("triangle vertices are collinear");
        };
        self.parse_surface(triangle)
    }

    fn parse_plane(&mut self) -> ParserResult<SceneObject> {
        self.match_token("plane")?;
        let point = self.parse_vec3()?;
        let normal = self.parse_direction("plane normal")?;
        let Ok(plane) = Plane::new(point, normal) else {
            return self.error("plane normal cannot be a zero vector");
        };
        self.parse_surface(plane)
    }

    fn parse_string(&mut self) -> ParserResult<String> {
        let next_token = self.pop();
        match next_token
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(inner) => Ok(inner.to_string()),
            None => self.error(&format!("expected a quoted string, getting '{}'", next_token)),
        }
    }

    fn parse_transformation(&mut self) -> ParserResult<Mat4> {
        let mut transform = Mat4::identity();
        while self.maybe_match(">") {
            let next_transform = if self.maybe_match("scale") {
                Mat4::scale(self.parse_positive("scale factor")?)
            } else if self.maybe_match("translate") {
                Mat4::translate(self.parse_vec3()?)
            } else if self.maybe_match("rotate") {
                let axis = self.parse_direction("rotation axis")?;
                let angle = self.parse_float()?;
                match Mat4::rotate(axis, angle.to_radians()) {
                    Ok(rotation) => rotation,
                    Err(_) => return self.error("rotation axis cannot be a zero vector"),
                }
            } else {
                let token = self.peek().clone();
                return self.error(&format!("unexpected token '{}' while parsing transform", token));
            };
            transform = transform.then(&next_transform);
        }
        Ok(transform)
    }

    fn parse_model(&mut self) -> ParserResult<Vec<SceneObject>> {
        self.match_token("model")?;
        let relative = self.parse_string()?;
        let path = self.base_dir.join(relative);
        let color = self.parse_color()?;
        let material = self.parse_material()?;
        let transform = self.parse_transformation()?;
        match model::load_triangles(&path, &transform) {
            Ok(triangles) => Ok(triangles
                .into_iter()
                .map(|triangle| SceneObject::new(triangle, color, material))
                .collect()),
            Err(err) => self.error(&format!("cannot load model \"{}\": {}", path.display(), err)),
        }
    }

    fn parse_light(&mut self) -> ParserResult<Light> {
        self.match_token("light")?;
        let position = self.parse_vec3()?;
        Ok(Light::new(position))
    }

    /// Parse the whole file.
    pub fn parse_scene(&mut self) -> ParserResult<ImageData> {
        let (width, height) = self.parse_header()?;

        let mut scene = Scene::new(DEFAULT_AMBIENT);
        while !self.is_empty() {
            let next_token = self.peek().clone();
            match next_token.as_str() {
                "ambient" => {
                    self.pop();
                    scene.ambient = self.parse_float()?;
                }
                "light" => {
                    let light = self.parse_light()?;
                    scene.add_light(light);
                }
                "sphere" => {
                    let object = self.parse_sphere()?;
                    scene.add_object(object);
                }
                "triangle" => {
                    let object = self.parse_triangle()?;
                    scene.add_object(object);
                }
                "plane" => {
                    let object = self.parse_plane()?;
                    scene.add_object(object);
                }
                "model" => {
                    let objects = self.parse_model()?;
                    scene.objects.extend(objects);
                }
                _ => {
                    return self.error(&format!("unexpected token '{}'", next_token));
                }
            }
        }
        debug!(
            "parsed {} object(s) and {} light(s)",
            scene.objects.len(),
            scene.lights.len()
        );
        Ok(ImageData {
            width,
            height,
            scene,
        })
    }
}
