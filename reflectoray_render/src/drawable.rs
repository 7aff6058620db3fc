use super::*;

use core::ops::Deref;
use std::{rc::Rc, sync::Arc};

/// Size, in pixels, of the mark drawn at the origin of a path.
pub const ORIGIN_MARK_SIZE: u32 = 7;

/// Something that can be drawn on a [`Canvas`] with a single color.
#[impl_trait_for_tuples::impl_for_tuples(1, 16)]
pub trait Draw {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>);
}

impl<T: Draw> Draw for [T] {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        self.iter().for_each(|a| a.draw(canvas, color));
    }
}

impl<const N: usize, T: Draw> Draw for [T; N] {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        self.as_slice().draw(canvas, color);
    }
}

// It's clear that all these impls use the `Deref` trait, but writing a blanket impl over all
// types implementing `Deref` makes the trait unusable downstream

impl<T: Draw + ?Sized> Draw for Box<T> {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        self.deref().draw(canvas, color);
    }
}

impl<T: Draw + ?Sized> Draw for Arc<T> {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        self.deref().draw(canvas, color);
    }
}

impl<T: Draw + ?Sized> Draw for Rc<T> {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        self.deref().draw(canvas, color);
    }
}

impl<T: Draw> Draw for Vec<T> {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        self.deref().draw(canvas, color);
    }
}

impl<T: Draw + ?Sized> Draw for &T {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        (*self).draw(canvas, color);
    }
}

impl Draw for Mirror {
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        canvas.line(self.start(), self.end(), color);
    }
}

impl Draw for Path {
    /// Draws every segment of the path, and marks its origin with an "x".
    fn draw(&self, canvas: &mut Canvas, color: Rgb<u8>) {
        for [a, b] in self.segments() {
            canvas.line(&a, &b, color);
        }
        canvas.cross(self.origin(), ORIGIN_MARK_SIZE, color);
    }
}
