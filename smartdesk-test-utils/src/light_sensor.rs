// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use smartdesk_telemetry::{LightSensor, LuxListener};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scriptable stand-in for the platform light sensor.
pub struct MockLightSensor {
    available: AtomicBool,
    reject_registration: AtomicBool,
    listener: Mutex<Option<LuxListener>>,
    registrations: AtomicUsize,
    unregistrations: AtomicUsize,
}

impl MockLightSensor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            reject_registration: AtomicBool::new(false),
            listener: Mutex::new(None),
            registrations: AtomicUsize::new(0),
            unregistrations: AtomicUsize::new(0),
        }
    }

    /// A device without an ambient light sensor.
    #[must_use]
    pub fn unavailable() -> Self {
        let sensor = Self::new();
        sensor.available.store(false, Ordering::SeqCst);
        sensor
    }

    pub fn reject_registrations(&self, reject: bool) {
        self.reject_registration.store(reject, Ordering::SeqCst);
    }

    /// Delivers one sample to the registered listener. Returns whether anyone
    /// was listening.
    pub fn emit(&self, lux: f32) -> bool {
        match self.listener.lock().as_ref() {
            Some(listener) => {
                listener(lux);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.listener.lock().is_some()
    }

    #[must_use]
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn unregistrations(&self) -> usize {
        self.unregistrations.load(Ordering::SeqCst)
    }
}

impl Default for MockLightSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl LightSensor for MockLightSensor {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn register(&self, listener: LuxListener) -> bool {
        if self.reject_registration.load(Ordering::SeqCst) {
            return false;
        }
        self.registrations.fetch_add(1, Ordering::SeqCst);
        *self.listener.lock() = Some(listener);
        true
    }

    fn unregister(&self) {
        self.unregistrations.fetch_add(1, Ordering::SeqCst);
        self.listener.lock().take();
    }
}
