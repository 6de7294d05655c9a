use crate::config::StitchPolicy;

/// Turns lap-relative arc lengths into race distance.
///
/// Holds the fold state of one driver's timeline; feed it samples in the order
/// they were recorded.
#[derive(Clone, Debug)]
pub struct RaceDistanceStitcher {
    policy: StitchPolicy,
    track_length: f64,
    /// (previous projection, previous race distance)
    prev: Option<(f64, f64)>,
}

impl RaceDistanceStitcher {
    pub fn new(policy: StitchPolicy, track_length: f64) -> Self {
        Self {
            policy,
            track_length,
            prev: None,
        }
    }

    pub fn policy(&self) -> StitchPolicy {
        self.policy
    }

    /// Race distance for a projection taken on `lap_number` (1-based).
    pub fn stitch(&mut self, projected: f64, lap_number: u32) -> f64 {
        let total = match self.policy {
            StitchPolicy::ContinuousUnwrap => self.unwrap(projected),
            StitchPolicy::LapMultiplied => {
                lap_number.saturating_sub(1) as f64 * self.track_length + projected
            }
        };
        self.prev = Some((projected, total));
        total
    }

    fn unwrap(&self, projected: f64) -> f64 {
        let Some((prev_projected, prev_total)) = self.prev else {
            return projected;
        };

        let half = self.track_length * 0.5;
        let mut delta = projected - prev_projected;
        if delta < -half {
            // crossed start/finish going forward
            delta += self.track_length;
        } else if delta > half {
            // crossed start/finish backwards
            delta -= self.track_length;
        }

        // jitter never moves a car backwards
        (prev_total + delta).max(prev_total)
    }
}
