use super::fabrik::FabrikSolver;
use super::hint::{HintEstimator, DEFAULT_HINT_DISTANCE, DEFAULT_STRAIGHT_ANGLE_DEGREES};
use super::solver::{IkSolver, TwoBoneSolver, DEFAULT_REACH_MARGIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    #[default]
    TwoBone,
    Fabrik,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkConfig {
    pub solver: SolverKind,
    pub hint_distance: f32,
    pub straight_angle_degrees: f32,
    pub reach_margin: f32,
    pub fabrik_iterations: u32,
    pub fabrik_tolerance: f32,
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            solver: SolverKind::TwoBone,
            hint_distance: DEFAULT_HINT_DISTANCE,
            straight_angle_degrees: DEFAULT_STRAIGHT_ANGLE_DEGREES,
            reach_margin: DEFAULT_REACH_MARGIN,
            fabrik_iterations: 10,
            fabrik_tolerance: 0.001,
        }
    }
}

impl IkConfig {
    pub fn new(solver: SolverKind) -> Self {
        Self {
            solver,
            ..Default::default()
        }
    }

    pub fn with_hint_distance(mut self, distance: f32) -> Self {
        self.hint_distance = distance;
        self
    }

    pub fn with_straight_angle(mut self, degrees: f32) -> Self {
        self.straight_angle_degrees = degrees;
        self
    }

    pub fn with_reach_margin(mut self, margin: f32) -> Self {
        self.reach_margin = margin.clamp(0.0, 1.0);
        self
    }

    pub fn with_fabrik(mut self, iterations: u32, tolerance: f32) -> Self {
        self.fabrik_iterations = iterations;
        self.fabrik_tolerance = tolerance;
        self
    }

    pub fn build_solver(&self) -> Box<dyn IkSolver> {
        match self.solver {
            SolverKind::TwoBone => Box::new(TwoBoneSolver::new(self.reach_margin)),
            SolverKind::Fabrik => Box::new(
                FabrikSolver::new(self.fabrik_tolerance, self.fabrik_iterations)
                    .with_reach_margin(self.reach_margin),
            ),
        }
    }

    pub fn hint_estimator(&self) -> HintEstimator {
        HintEstimator::new(self.hint_distance, self.straight_angle_degrees)
    }
}
