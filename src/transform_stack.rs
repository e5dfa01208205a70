use {
    glam::{Mat4, Vec3},
    std::ops::{Deref, DerefMut},
};

/// Current composed transform plus the matrices saved beneath it.
///
/// Saving only happens through [`TransformStack::push`], which hands out a
/// [`TransformScope`]; the saved matrix is restored when the scope drops.
#[derive(Debug, Default)]
pub struct TransformStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> Mat4 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Replaces the current matrix. Saved matrices are left untouched.
    pub fn load(&mut self, matrix: Mat4) {
        self.current = matrix;
    }

    pub fn multiply(&mut self, matrix: Mat4) {
        self.current *= matrix;
    }

    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.multiply(Mat4::from_axis_angle(
            axis.normalize(),
            angle_degrees.to_radians(),
        ));
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.multiply(Mat4::from_translation(offset));
    }

    pub fn push(&mut self) -> TransformScope<'_> {
        self.saved.push(self.current);
        TransformScope { stack: self }
    }

    fn restore(&mut self) {
        if let Some(matrix) = self.saved.pop() {
            self.current = matrix;
        }
    }
}

/// Saved transform state; dereferences to the stack it was pushed on.
pub struct TransformScope<'a> {
    stack: &'a mut TransformStack,
}

impl Deref for TransformScope<'_> {
    type Target = TransformStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for TransformScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        self.stack.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_restores_on_drop() {
        let mut stack = TransformStack::new();
        stack.translate(Vec3::new(0.0, 0.0, -5.0));
        let before = stack.current();

        {
            let mut scope = stack.push();
            scope.rotate(30.0, Vec3::Z);
            scope.translate(Vec3::X * 2.0);
            assert_eq!(scope.depth(), 1);
            assert_ne!(scope.current(), before);
        }

        assert_eq!(stack.current(), before);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn nested_scopes_unwind_in_order() {
        let mut stack = TransformStack::new();

        let mut outer = stack.push();
        outer.translate(Vec3::Y);
        let after_outer = outer.current();
        {
            let mut inner = outer.push();
            inner.translate(Vec3::X);
            assert_eq!(inner.depth(), 2);
        }
        assert_eq!(outer.current(), after_outer);
        drop(outer);

        assert_eq!(stack.current(), Mat4::IDENTITY);
    }

    #[test]
    fn operations_compose_on_the_right() {
        let mut stack = TransformStack::new();
        stack.rotate(90.0, Vec3::Z);
        stack.translate(Vec3::X);

        // Translating along local X after a quarter turn about Z lands on +Y.
        let origin = stack.current().w_axis;
        assert!(origin.x.abs() < 1e-6);
        assert!((origin.y - 1.0).abs() < 1e-6);
        assert_eq!(origin.w, 1.0);
    }

    #[test]
    fn load_keeps_saved_state() {
        let mut stack = TransformStack::new();
        stack.translate(Vec3::Z);
        let saved = stack.current();
        {
            let mut scope = stack.push();
            scope.load(Mat4::IDENTITY);
            assert_eq!(scope.current(), Mat4::IDENTITY);
        }
        assert_eq!(stack.current(), saved);
    }
}
