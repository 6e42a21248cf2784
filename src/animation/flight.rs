use crate::{animation::easing::EasingType, core::geo::LatLng, prelude::Duration};

/// Current camera state produced by a flight step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub center: LatLng,
    pub zoom: f64,
    /// 0.0 at takeoff, 1.0 on landing
    pub progress: f64,
}

/// A fire-and-forget camera transition over simulated time.
///
/// Flights are never cancelled; starting a new one replaces the old one
/// from wherever the camera currently is.
#[derive(Debug, Clone)]
pub struct CameraFlight {
    elapsed: Duration,
    duration: Duration,
    easing: EasingType,
    from_center: LatLng,
    to_center: LatLng,
    from_zoom: f64,
    to_zoom: f64,
}

impl CameraFlight {
    pub fn new(
        from_center: LatLng,
        from_zoom: f64,
        to_center: LatLng,
        to_zoom: f64,
        duration: Duration,
        easing: EasingType,
    ) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
            easing,
            from_center,
            to_center,
            from_zoom,
            to_zoom,
        }
    }

    pub fn target(&self) -> (LatLng, f64) {
        (self.to_center, self.to_zoom)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advances the flight and returns the camera for the new time
    pub fn step(&mut self, delta: Duration) -> CameraState {
        self.elapsed = (self.elapsed + delta).min(self.duration);
        self.state()
    }

    pub fn state(&self) -> CameraState {
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
        };
        if progress >= 1.0 {
            return CameraState {
                center: self.to_center,
                zoom: self.to_zoom,
                progress: 1.0,
            };
        }
        let t = self.easing.apply(progress);

        CameraState {
            center: self.from_center.lerp(&self.to_center, t),
            zoom: self.from_zoom + (self.to_zoom - self.from_zoom) * t,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_lands_on_target() {
        let tokyo = LatLng::new(35.6762, 139.6503);
        let kyoto = LatLng::new(35.0116, 135.7681);
        let mut flight = CameraFlight::new(
            tokyo,
            6.0,
            kyoto,
            10.0,
            Duration::from_millis(1000),
            EasingType::EaseInOut,
        );

        let half = flight.step(Duration::from_millis(500));
        assert!(!flight.is_finished());
        assert!((half.zoom - 8.0).abs() < 1e-9);

        let landed = flight.step(Duration::from_millis(800));
        assert!(flight.is_finished());
        assert_eq!(landed.progress, 1.0);
        assert_eq!(landed.center, kyoto);
        assert_eq!(landed.zoom, 10.0);
    }

    #[test]
    fn test_zero_duration_flight_is_instant() {
        let here = LatLng::new(34.6937, 135.5023);
        let flight = CameraFlight::new(here, 9.0, here, 12.0, Duration::ZERO, EasingType::Linear);
        assert!(flight.is_finished());
        assert_eq!(flight.state().zoom, 12.0);
    }
}
