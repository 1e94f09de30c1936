//! 线程安全包装
//!
//! 指标本身只是 `Send`。需要在多个线程之间共享同一个指标时，
//! 用 `Locked` 包一层，所有调用在互斥锁内串行执行。

use parking_lot::{Mutex, MutexGuard};

use super::{MultiStudy, Shape, Study, StudyMeta, StudyValue};
use crate::error::Result;

#[derive(Debug)]
pub struct Locked<T> {
    inner: Mutex<T>,
}

impl<T> Locked<T> {
    pub fn new(study: T) -> Self {
        Self {
            inner: Mutex::new(study),
        }
    }

    /// 直接拿到锁，用于一次做多个操作
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: Study> Locked<T> {
    /// 共享引用即可推进
    pub fn update(&self, value: f64) -> f64 {
        self.inner.lock().update(value)
    }

    pub fn setup(&self, input: &[f64]) -> Vec<f64> {
        self.inner.lock().setup(input)
    }
}

impl<T: MultiStudy> Locked<T> {
    pub fn update_all(&self, inputs: &[f64]) -> Result<StudyValue> {
        self.inner.lock().update_all(inputs)
    }
}

impl<T: Clone> Clone for Locked<T> {
    fn clone(&self) -> Self {
        Self::new(self.inner.lock().clone())
    }
}

impl<T: StudyMeta> StudyMeta for Locked<T> {
    fn name(&self) -> &'static str {
        self.inner.lock().name()
    }

    fn warmup(&self) -> usize {
        self.inner.lock().warmup()
    }
}

impl<T: Study + Clone + 'static> Study for Locked<T> {
    fn update(&mut self, value: f64) -> f64 {
        self.inner.get_mut().update(value)
    }

    fn period(&self) -> usize {
        self.inner.lock().period()
    }

    fn boxed_clone(&self) -> Box<dyn Study> {
        Box::new(self.clone())
    }
}

impl<T: MultiStudy + Clone + 'static> MultiStudy for Locked<T> {
    fn arity(&self) -> usize {
        self.inner.lock().arity()
    }

    fn shape(&self) -> Shape {
        self.inner.lock().shape()
    }

    fn update_all(&mut self, inputs: &[f64]) -> Result<StudyValue> {
        self.inner.get_mut().update_all(inputs)
    }

    fn scalar_lane(&self) -> usize {
        self.inner.lock().scalar_lane()
    }

    fn periods(&self) -> Vec<usize> {
        self.inner.lock().periods()
    }

    fn boxed_clone_multi(&self) -> Box<dyn MultiStudy> {
        Box::new(self.clone())
    }
}
