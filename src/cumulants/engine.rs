//! Cumulant session: integrated cumulants of one observed realisation.
//!
//! Purpose
//! -------
//! Own a [`ProcessCollection`] together with the arrays derived from it and
//! expose one operation per estimator stage. Every stage is a pure function of
//! the sequences, the intensities, the horizon and the bandwidth; the session
//! only caches results and enforces the order in which stages may run.
//!
//! Key behaviors
//! -------------
//! - Integrated covariance `C[i,j] = A(N_i, N_j, −h, h)`, symmetrized.
//! - Integrated lag intensity `J[i,j] = I(N_i, N_j, h)`, symmetrized.
//! - Third-moment tensor `E_c` (`d × d × 2`) at half bandwidth `h/2`:
//!   `E_c[i,j,0] = E(N_i, N_j, N_j)` and `E_c[i,j,1] = E(N_j, N_j, N_i)`.
//! - Empirical third cumulant `K_c` from `L`, `C`, `J`, `E_c` with
//!   `M = h·C − 2J` (see [`ThirdCumulantFormula`]).
//! - Alternative third cumulant `F_c`, bandwidth matrix `H`, theoretical
//!   cumulants for a ground-truth `R`, and GMM weighting matrices.
//!
//! Invariants & assumptions
//! ------------------------
//! - `C` and `J` are exactly symmetric after their stage completes.
//! - `K_c` requires `C`, `E_c` and `J` (checked in that order); `K_c_th`
//!   requires `C_th`; both theoretical stages require a ground truth.
//! - Reassigning the sequences clears every derived array, so stale arrays
//!   never mix with new intensities.
//!
//! Conventions
//! -----------
//! - A bandwidth of `None` means the session default `h_max`.
//! - Plain operations use the session's [`ExecutionStrategy`]; the `*_with`
//!   forms take it explicitly. Both strategies give identical arrays.
//! - Stage progress is reported through `tracing` (`debug!` per stage) and,
//!   for [`Cumulants::compute_all`], through a caller-supplied
//!   [`ProgressSink`].
//!
//! Downstream usage
//! ----------------
//! - [`Cumulants::moments`] yields the `(L, C, K_c)` triple consumed by
//!   [`crate::fitting::fit_kernel_integrals`].
//!
//! Testing notes
//! -------------
//! - Unit tests below cover ordering errors, symmetry, strategy equivalence,
//!   Poisson expectations on hand-built data, and state clearing.
//! - Statistical convergence against theoretical cumulants lives in the
//!   integration suite.
use ndarray::{Array1, Array2, Array3, ArrayView1};
use tracing::{debug, info};

use crate::{
    cumulants::{
        bandwidth::BandwidthRule,
        errors::{CumulantError, CumulantResult},
        kernels::{lag_integral, window_count, window_product, Marginal},
        options::{verify_bandwidth, CumulantOptions, ExecutionStrategy, ThirdCumulantFormula},
        progress::{ProgressSink, Stage},
        strategy::{fill_pair_tuples, fill_pairs, symmetrize},
        theory::{self, KernelIntegrals},
        weighting::{self, SampleLog, WeightingAccumulation},
    },
    process::{EventSequence, ProcessCollection},
};

/// The `(L, C, K_c)` moment triple handed to the fitting driver.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentSummary {
    pub intensities: Array1<f64>,
    pub covariance: Array2<f64>,
    pub third_cumulant: Array2<f64>,
}

/// Integrated-cumulant session over one process realisation.
#[derive(Debug, Clone)]
pub struct Cumulants {
    process: ProcessCollection,
    options: CumulantOptions,
    covariance: Option<Array2<f64>>,
    integrated_intensity: Option<Array2<f64>>,
    third_moment: Option<Array3<f64>>,
    third_cumulant: Option<Array2<f64>>,
    alternative_third_cumulant: Option<Array2<f64>>,
    bandwidths: Option<Array2<f64>>,
    ground_truth: Option<Array2<f64>>,
    theoretical_covariance: Option<Array2<f64>>,
    theoretical_third_cumulant: Option<Array2<f64>>,
    second_order_weighting: Option<Array2<f64>>,
    third_order_weighting: Option<Array2<f64>>,
    samples: SampleLog,
}

impl Cumulants {
    pub fn new(process: ProcessCollection, options: CumulantOptions) -> Self {
        Self {
            process,
            options,
            covariance: None,
            integrated_intensity: None,
            third_moment: None,
            third_cumulant: None,
            alternative_third_cumulant: None,
            bandwidths: None,
            ground_truth: None,
            theoretical_covariance: None,
            theoretical_third_cumulant: None,
            second_order_weighting: None,
            third_order_weighting: None,
            samples: SampleLog::new(),
        }
    }

    /// Validate raw sorted timestamps and open a session.
    ///
    /// # Errors
    /// [`CumulantError::InvalidProcess`] when a sequence is unsorted or holds
    /// non-finite values.
    pub fn from_sequences(raw: Vec<Vec<f64>>, options: CumulantOptions) -> CumulantResult<Self> {
        Ok(Self::new(ProcessCollection::from_vecs(raw)?, options))
    }

    // ---- Inputs ----

    pub fn process(&self) -> &ProcessCollection {
        &self.process
    }

    pub fn options(&self) -> &CumulantOptions {
        &self.options
    }

    pub fn dim(&self) -> usize {
        self.process.dim()
    }

    pub fn horizon(&self) -> f64 {
        self.process.horizon()
    }

    pub fn intensities(&self) -> &Array1<f64> {
        self.process.intensities()
    }

    /// Replace the sequences, recompute `T` and `L`, and drop every array
    /// derived from the previous data. The ground truth survives only when
    /// the dimension is unchanged.
    pub fn set_processes(&mut self, sequences: Vec<EventSequence>) {
        let previous_dim = self.dim();
        self.process.set_sequences(sequences);
        if self.dim() != previous_dim {
            self.ground_truth = None;
        }
        self.clear_derived();
    }

    /// Replace the bandwidth default, strategy and formula flags.
    ///
    /// A new trend convention invalidates `E_c` and everything built on it;
    /// a new formula invalidates `K_c`.
    pub fn set_options(&mut self, options: CumulantOptions) {
        if options.trend() != self.options.trend() {
            self.third_moment = None;
            self.third_cumulant = None;
            self.alternative_third_cumulant = None;
        }
        if options.formula() != self.options.formula() {
            self.third_cumulant = None;
        }
        self.options = options;
    }

    fn clear_derived(&mut self) {
        self.covariance = None;
        self.integrated_intensity = None;
        self.third_moment = None;
        self.third_cumulant = None;
        self.alternative_third_cumulant = None;
        self.bandwidths = None;
        self.theoretical_covariance = None;
        self.theoretical_third_cumulant = None;
    }

    fn marginals(&self) -> Vec<Marginal<'_>> {
        self.process
            .sequences()
            .iter()
            .zip(self.process.intensities().iter())
            .map(|(seq, &intensity)| Marginal::new(seq.as_slice(), intensity))
            .collect()
    }

    fn resolve_bandwidth(&self, h: Option<f64>) -> CumulantResult<f64> {
        match h {
            Some(h) => {
                verify_bandwidth(h)?;
                Ok(h)
            }
            None => Ok(self.options.h_max()),
        }
    }

    // ---- Empirical stages ----

    /// Integrated covariance `C` with the session strategy.
    ///
    /// # Errors
    /// [`CumulantError::InvalidBandwidth`] for a non-positive or non-finite `h`.
    pub fn compute_covariance(&mut self, h: Option<f64>) -> CumulantResult<&Array2<f64>> {
        self.compute_covariance_with(h, self.options.strategy())
    }

    pub fn compute_covariance_with(
        &mut self, h: Option<f64>, strategy: ExecutionStrategy,
    ) -> CumulantResult<&Array2<f64>> {
        let h = self.resolve_bandwidth(h)?;
        let horizon = self.horizon();
        let marginals = self.marginals();
        let mut c = fill_pairs(self.dim(), strategy, |i, j| {
            window_count(marginals[i], marginals[j], -h, h, horizon)
        });
        symmetrize(&mut c);
        debug!(dim = self.dim(), bandwidth = h, "integrated covariance computed");
        Ok(&*self.covariance.insert(c))
    }

    /// Integrated lag intensity `J` with the session strategy.
    ///
    /// # Errors
    /// [`CumulantError::InvalidBandwidth`] for a non-positive or non-finite `h`.
    pub fn compute_integrated_intensity(&mut self, h: Option<f64>) -> CumulantResult<&Array2<f64>> {
        self.compute_integrated_intensity_with(h, self.options.strategy())
    }

    pub fn compute_integrated_intensity_with(
        &mut self, h: Option<f64>, strategy: ExecutionStrategy,
    ) -> CumulantResult<&Array2<f64>> {
        let h = self.resolve_bandwidth(h)?;
        let horizon = self.horizon();
        let marginals = self.marginals();
        let mut j_mat = fill_pairs(self.dim(), strategy, |i, j| {
            lag_integral(marginals[i], marginals[j], h, horizon)
        });
        symmetrize(&mut j_mat);
        debug!(dim = self.dim(), bandwidth = h, "integrated lag intensity computed");
        Ok(&*self.integrated_intensity.insert(j_mat))
    }

    /// Third-moment tensor `E_c` (half bandwidth) with the session strategy.
    ///
    /// # Errors
    /// [`CumulantError::InvalidBandwidth`] for a non-positive or non-finite `h`.
    pub fn compute_third_moment_tensor(&mut self, h: Option<f64>) -> CumulantResult<&Array3<f64>> {
        self.compute_third_moment_tensor_with(h, self.options.strategy())
    }

    pub fn compute_third_moment_tensor_with(
        &mut self, h: Option<f64>, strategy: ExecutionStrategy,
    ) -> CumulantResult<&Array3<f64>> {
        let half = 0.5 * self.resolve_bandwidth(h)?;
        let horizon = self.horizon();
        let trend = self.options.trend();
        let marginals = self.marginals();
        let (e0, e1) = fill_pair_tuples(self.dim(), strategy, |i, j| {
            let (ni, nj) = (marginals[i], marginals[j]);
            (
                window_product(ni, nj, nj, -half, half, horizon, trend),
                window_product(nj, nj, ni, -half, half, horizon, trend),
            )
        });
        let d = self.dim();
        let e_c = Array3::from_shape_fn((d, d, 2), |(i, j, k)| {
            if k == 0 {
                e0[[i, j]]
            } else {
                e1[[i, j]]
            }
        });
        debug!(dim = d, bandwidth = 2.0 * half, "third-moment tensor computed");
        Ok(&*self.third_moment.insert(e_c))
    }

    /// Empirical third cumulant `K_c` from the stored `C`, `E_c`, `J`.
    ///
    /// `h` must be the bandwidth the inputs were computed with.
    ///
    /// # Errors
    /// - [`CumulantError::MissingPrerequisite`] naming the first of `C`, `E_c`,
    ///   `J` that is missing.
    /// - [`CumulantError::InvalidBandwidth`] for an invalid `h`.
    pub fn compute_empirical_third_cumulant(
        &mut self, h: Option<f64>,
    ) -> CumulantResult<&Array2<f64>> {
        let h = self.resolve_bandwidth(h)?;
        let requested = Stage::ThirdCumulant;
        let c = self.covariance.as_ref().ok_or(CumulantError::MissingPrerequisite {
            requested,
            missing: Stage::Covariance,
        })?;
        let e_c = self.third_moment.as_ref().ok_or(CumulantError::MissingPrerequisite {
            requested,
            missing: Stage::ThirdMoment,
        })?;
        let j = self.integrated_intensity.as_ref().ok_or(CumulantError::MissingPrerequisite {
            requested,
            missing: Stage::IntegratedIntensity,
        })?;
        let k_c = assemble_third_cumulant(
            self.process.intensities().view(),
            c,
            j,
            e_c,
            h,
            self.options.formula(),
        );
        debug!(dim = self.dim(), bandwidth = h, "empirical third cumulant computed");
        Ok(&*self.third_cumulant.insert(k_c))
    }

    /// Run every empirical stage in order, then the theoretical stages when a
    /// ground truth is set. `sink` is notified after each stage and once more
    /// with [`Stage::All`].
    ///
    /// # Errors
    /// Propagates the first stage error.
    pub fn compute_all<S>(&mut self, h: Option<f64>, sink: &S) -> CumulantResult<()>
    where
        S: ProgressSink + ?Sized,
    {
        self.compute_covariance(h)?;
        sink.stage_completed(Stage::Covariance);
        self.compute_third_moment_tensor(h)?;
        sink.stage_completed(Stage::ThirdMoment);
        self.compute_integrated_intensity(h)?;
        sink.stage_completed(Stage::IntegratedIntensity);
        self.compute_empirical_third_cumulant(h)?;
        sink.stage_completed(Stage::ThirdCumulant);
        if self.ground_truth.is_some() {
            self.compute_theoretical_covariance()?;
            sink.stage_completed(Stage::TheoreticalCovariance);
            self.compute_theoretical_third_cumulant()?;
            sink.stage_completed(Stage::TheoreticalThirdCumulant);
        }
        sink.stage_completed(Stage::All);
        info!(dim = self.dim(), horizon = self.horizon(), "all integrated cumulants computed");
        Ok(())
    }

    /// Alternative third-cumulant estimator `F_c` at full bandwidth.
    ///
    /// Combines a window product with window counts and lag integrals at
    /// twice the bandwidth:
    /// `F[i,j] = (2·(E(N_j,N_i,N_j) − L_j·(2h·A(N_i,N_j,±2h) − 2·I(N_j,N_i,2h)))
    ///          + E(N_j,N_j,N_i) − L_i·(2h·A(N_j,N_j,±2h) − 2·I(N_j,N_j,2h))) / 3`.
    ///
    /// # Errors
    /// [`CumulantError::InvalidBandwidth`] for an invalid `h`.
    pub fn compute_alternative_third_cumulant(
        &mut self, h: Option<f64>,
    ) -> CumulantResult<&Array2<f64>> {
        self.compute_alternative_third_cumulant_with(h, self.options.strategy())
    }

    pub fn compute_alternative_third_cumulant_with(
        &mut self, h: Option<f64>, strategy: ExecutionStrategy,
    ) -> CumulantResult<&Array2<f64>> {
        let h = self.resolve_bandwidth(h)?;
        let horizon = self.horizon();
        let trend = self.options.trend();
        let marginals = self.marginals();
        let f_c = fill_pairs(self.dim(), strategy, |i, j| {
            let (ni, nj) = (marginals[i], marginals[j]);
            let cross = window_product(nj, ni, nj, -h, h, horizon, trend)
                - nj.intensity
                    * (2.0 * h * window_count(ni, nj, -2.0 * h, 2.0 * h, horizon)
                        - 2.0 * lag_integral(nj, ni, 2.0 * h, horizon));
            let own = window_product(nj, nj, ni, -h, h, horizon, trend)
                - ni.intensity
                    * (2.0 * h * window_count(nj, nj, -2.0 * h, 2.0 * h, horizon)
                        - 2.0 * lag_integral(nj, nj, 2.0 * h, horizon));
            (2.0 * cross + own) / 3.0
        });
        debug!(dim = self.dim(), bandwidth = h, "alternative third cumulant computed");
        Ok(&*self.alternative_third_cumulant.insert(f_c))
    }

    /// Per-pair bandwidth matrix `H`.
    ///
    /// # Errors
    /// [`CumulantError::InvalidGridSize`] for an empty search grid.
    pub fn select_bandwidths(&mut self, rule: BandwidthRule) -> CumulantResult<&Array2<f64>> {
        let h = rule.select(&self.marginals(), self.horizon(), self.options)?;
        Ok(&*self.bandwidths.insert(h))
    }

    // ---- Ground truth and theoretical stages ----

    /// Store the true kernel-integral matrix (flattened or `d × d`).
    ///
    /// # Errors
    /// [`CumulantError::KernelIntegralShape`] when the input does not match
    /// the process dimension.
    pub fn set_ground_truth(&mut self, r: KernelIntegrals<'_>) -> CumulantResult<()> {
        self.ground_truth = Some(r.into_matrix(self.dim())?);
        self.theoretical_covariance = None;
        self.theoretical_third_cumulant = None;
        Ok(())
    }

    /// `C_th = R·diag(L)·Rᵀ` for the stored ground truth.
    ///
    /// # Errors
    /// - [`CumulantError::MissingGroundTruth`] without a ground truth.
    /// - [`CumulantError::KernelIntegralShape`] when the stored `R` is not
    ///   `d × d`.
    pub fn compute_theoretical_covariance(&mut self) -> CumulantResult<&Array2<f64>> {
        let r = self.require_ground_truth(Stage::TheoreticalCovariance)?;
        let c_th = theory::covariance_map(self.process.intensities().view(), r.view());
        Ok(&*self.theoretical_covariance.insert(c_th))
    }

    /// `K_c_th` for the stored ground truth and `C_th`.
    ///
    /// # Errors
    /// - [`CumulantError::MissingGroundTruth`] without a ground truth.
    /// - [`CumulantError::KernelIntegralShape`] when the stored `R` is not
    ///   `d × d`.
    /// - [`CumulantError::MissingPrerequisite`] when `C_th` is missing.
    pub fn compute_theoretical_third_cumulant(&mut self) -> CumulantResult<&Array2<f64>> {
        let requested = Stage::TheoreticalThirdCumulant;
        let r = self.require_ground_truth(requested)?;
        let c_th = self.theoretical_covariance.as_ref().ok_or(
            CumulantError::MissingPrerequisite { requested, missing: Stage::TheoreticalCovariance },
        )?;
        let k_th =
            theory::third_cumulant_map(self.process.intensities().view(), c_th.view(), r.view());
        Ok(&*self.theoretical_third_cumulant.insert(k_th))
    }

    fn require_ground_truth(&self, requested: Stage) -> CumulantResult<&Array2<f64>> {
        let r = self.ground_truth.as_ref().ok_or(CumulantError::MissingGroundTruth { requested })?;
        let d = self.dim();
        if r.dim() != (d, d) {
            return Err(CumulantError::KernelIntegralShape { dim: d, found: r.shape().to_vec() });
        }
        Ok(r)
    }

    // ---- Sample log and weighting matrices ----

    pub fn samples(&self) -> &SampleLog {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut SampleLog {
        &mut self.samples
    }

    /// Append the current `(L, C, K_c)` to the sample log.
    ///
    /// # Errors
    /// [`CumulantError::MissingPrerequisite`] when `C` or `K_c` is missing.
    pub fn push_current_sample(&mut self) -> CumulantResult<()> {
        let moments = self.moments()?;
        self.samples.push_sample(moments.intensities, moments.covariance, moments.third_cumulant);
        Ok(())
    }

    /// Store `W_2` computed from the sample log.
    ///
    /// # Errors
    /// Configuration and shape errors from
    /// [`weighting::second_order_weighting`].
    pub fn set_second_order_weighting(
        &mut self, r: KernelIntegrals<'_>,
    ) -> CumulantResult<&Array2<f64>> {
        let r = r.into_matrix(self.dim())?;
        let w2 = weighting::second_order_weighting(&self.samples, r.view())?;
        Ok(&*self.second_order_weighting.insert(w2))
    }

    /// Store `W_3` computed from the sample log.
    ///
    /// # Errors
    /// Configuration and shape errors from
    /// [`weighting::third_order_weighting`].
    pub fn set_third_order_weighting(
        &mut self, r: KernelIntegrals<'_>, accumulation: WeightingAccumulation,
    ) -> CumulantResult<&Array2<f64>> {
        let r = r.into_matrix(self.dim())?;
        let w3 = weighting::third_order_weighting(&self.samples, r.view(), accumulation)?;
        Ok(&*self.third_order_weighting.insert(w3))
    }

    // ---- Accessors ----

    pub fn covariance(&self) -> Option<&Array2<f64>> {
        self.covariance.as_ref()
    }

    pub fn integrated_intensity(&self) -> Option<&Array2<f64>> {
        self.integrated_intensity.as_ref()
    }

    pub fn third_moment(&self) -> Option<&Array3<f64>> {
        self.third_moment.as_ref()
    }

    pub fn third_cumulant(&self) -> Option<&Array2<f64>> {
        self.third_cumulant.as_ref()
    }

    pub fn alternative_third_cumulant(&self) -> Option<&Array2<f64>> {
        self.alternative_third_cumulant.as_ref()
    }

    pub fn bandwidths(&self) -> Option<&Array2<f64>> {
        self.bandwidths.as_ref()
    }

    pub fn ground_truth(&self) -> Option<&Array2<f64>> {
        self.ground_truth.as_ref()
    }

    pub fn theoretical_covariance(&self) -> Option<&Array2<f64>> {
        self.theoretical_covariance.as_ref()
    }

    pub fn theoretical_third_cumulant(&self) -> Option<&Array2<f64>> {
        self.theoretical_third_cumulant.as_ref()
    }

    pub fn second_order_weighting(&self) -> Option<&Array2<f64>> {
        self.second_order_weighting.as_ref()
    }

    pub fn third_order_weighting(&self) -> Option<&Array2<f64>> {
        self.third_order_weighting.as_ref()
    }

    /// `C`, or [`CumulantError::MissingPrerequisite`] on behalf of `requested`.
    pub fn require_covariance(&self, requested: Stage) -> CumulantResult<&Array2<f64>> {
        self.covariance
            .as_ref()
            .ok_or(CumulantError::MissingPrerequisite { requested, missing: Stage::Covariance })
    }

    pub fn require_integrated_intensity(&self, requested: Stage) -> CumulantResult<&Array2<f64>> {
        self.integrated_intensity.as_ref().ok_or(CumulantError::MissingPrerequisite {
            requested,
            missing: Stage::IntegratedIntensity,
        })
    }

    pub fn require_third_moment(&self, requested: Stage) -> CumulantResult<&Array3<f64>> {
        self.third_moment
            .as_ref()
            .ok_or(CumulantError::MissingPrerequisite { requested, missing: Stage::ThirdMoment })
    }

    pub fn require_third_cumulant(&self, requested: Stage) -> CumulantResult<&Array2<f64>> {
        self.third_cumulant
            .as_ref()
            .ok_or(CumulantError::MissingPrerequisite { requested, missing: Stage::ThirdCumulant })
    }

    /// The `(L, C, K_c)` triple for the fitting driver.
    ///
    /// # Errors
    /// [`CumulantError::MissingPrerequisite`] when `C` or `K_c` is missing.
    pub fn moments(&self) -> CumulantResult<MomentSummary> {
        let covariance = self.require_covariance(Stage::All)?.clone();
        let third_cumulant = self.require_third_cumulant(Stage::All)?.clone();
        Ok(MomentSummary {
            intensities: self.process.intensities().clone(),
            covariance,
            third_cumulant,
        })
    }

    /// Install previously computed empirical arrays.
    pub(crate) fn restore_arrays(
        &mut self, covariance: Option<Array2<f64>>, integrated_intensity: Option<Array2<f64>>,
        third_moment: Option<Array3<f64>>, third_cumulant: Option<Array2<f64>>,
    ) {
        self.covariance = covariance;
        self.integrated_intensity = integrated_intensity;
        self.third_moment = third_moment;
        self.third_cumulant = third_cumulant;
    }
}

/// Assemble `K_c` from `L`, `C`, `J` and `E_c` computed at bandwidth `h`.
///
/// With `M = h·C − 2J`:
/// - [`ThirdCumulantFormula::Reference`]:
///   `K[i,j] = (2·E0[i,j] − L_j·M[i,j] + E1[i,j] − L_i·M[j,j]) / 3`
/// - [`ThirdCumulantFormula::Balanced`]:
///   `K[i,j] = (2·(E0[i,j] − L_j·M[i,j]) + E1[i,j] − L_i·M[j,j]) / 3`
pub fn assemble_third_cumulant(
    intensities: ArrayView1<'_, f64>, covariance: &Array2<f64>, integrated_intensity: &Array2<f64>,
    third_moment: &Array3<f64>, h: f64, formula: ThirdCumulantFormula,
) -> Array2<f64> {
    let m = covariance * h - integrated_intensity * 2.0;
    let pair_weight = match formula {
        ThirdCumulantFormula::Reference => 1.0,
        ThirdCumulantFormula::Balanced => 2.0,
    };
    let d = intensities.len();
    Array2::from_shape_fn((d, d), |(i, j)| {
        let e0 = third_moment[[i, j, 0]];
        let e1 = third_moment[[i, j, 1]];
        (2.0 * e0 - pair_weight * intensities[j] * m[[i, j]] + e1 - intensities[i] * m[[j, j]])
            / 3.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cumulants::progress::RecordingProgress;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Stage preconditions and their error values.
    // - Symmetry of C and J; strategy equivalence.
    // - `compute_all` ordering through a recording sink.
    // - `K_c` assembly under both formulas.
    // - Clearing of derived arrays on reassignment.
    //
    // They intentionally DO NOT cover:
    // - Statistical convergence (integration tests).
    // -------------------------------------------------------------------------

    fn fixture() -> Cumulants {
        let raw = vec![
            vec![0.3, 1.1, 1.7, 2.9, 3.4, 4.8, 5.2, 6.6, 7.1, 9.0, 10.4, 11.9, 12.2, 14.0],
            vec![0.1, 0.9, 2.2, 2.5, 3.9, 4.4, 6.0, 6.9, 8.3, 9.5, 11.0, 13.3],
            vec![0.6, 1.4, 2.0, 3.1, 4.0, 5.5, 5.9, 7.4, 8.0, 8.8, 12.5, 13.9, 14.5],
        ];
        let options = CumulantOptions::new(1.5, ExecutionStrategy::Sequential).unwrap();
        Cumulants::from_sequences(raw, options).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // `K_c` before `C` reports the missing covariance.
    //
    // Given
    // -----
    // - A fresh session.
    //
    // Expect
    // ------
    // - `MissingPrerequisite { requested: K_c, missing: C }`.
    fn third_cumulant_before_covariance_is_precondition_error() {
        let mut cumul = fixture();

        let err = cumul.compute_empirical_third_cumulant(None).unwrap_err();

        assert_eq!(
            err,
            CumulantError::MissingPrerequisite {
                requested: Stage::ThirdCumulant,
                missing: Stage::Covariance
            }
        );
    }

    #[test]
    // Purpose
    // -------
    // Prerequisites are checked in the order C, E_c, J.
    //
    // Given
    // -----
    // - A session with only `C` computed, then with `C` and `J`.
    //
    // Expect
    // ------
    // - Both report `E_c` as missing.
    fn third_cumulant_checks_third_moment_before_lag_intensity() {
        let mut cumul = fixture();
        cumul.compute_covariance(None).unwrap();

        let first = cumul.compute_empirical_third_cumulant(None).unwrap_err();
        cumul.compute_integrated_intensity(None).unwrap();
        let second = cumul.compute_empirical_third_cumulant(None).unwrap_err();

        let expected = CumulantError::MissingPrerequisite {
            requested: Stage::ThirdCumulant,
            missing: Stage::ThirdMoment,
        };
        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }

    #[test]
    // Purpose
    // -------
    // `C` and `J` are exactly symmetric.
    //
    // Given
    // -----
    // - The three-dimensional fixture, default bandwidth.
    //
    // Expect
    // ------
    // - `C == Cᵀ` and `J == Jᵀ` bit-for-bit.
    fn covariance_and_lag_intensity_are_symmetric() {
        let mut cumul = fixture();

        let c = cumul.compute_covariance(None).unwrap().clone();
        let j = cumul.compute_integrated_intensity(None).unwrap().clone();

        assert_eq!(c, c.t().to_owned());
        assert_eq!(j, j.t().to_owned());
    }

    #[test]
    // Purpose
    // -------
    // The parallel strategy reproduces the sequential arrays exactly.
    //
    // Given
    // -----
    // - The fixture evaluated with both strategies for every stage.
    //
    // Expect
    // ------
    // - Identical `C`, `J`, `E_c` and `F_c`.
    fn parallel_strategy_matches_sequential() {
        let mut seq = fixture();
        let mut par = fixture();
        let (s, p) = (ExecutionStrategy::Sequential, ExecutionStrategy::Parallel);

        assert_eq!(
            seq.compute_covariance_with(None, s).unwrap(),
            par.compute_covariance_with(None, p).unwrap()
        );
        assert_eq!(
            seq.compute_integrated_intensity_with(Some(2.0), s).unwrap(),
            par.compute_integrated_intensity_with(Some(2.0), p).unwrap()
        );
        assert_eq!(
            seq.compute_third_moment_tensor_with(None, s).unwrap(),
            par.compute_third_moment_tensor_with(None, p).unwrap()
        );
        assert_eq!(
            seq.compute_alternative_third_cumulant_with(None, s).unwrap(),
            par.compute_alternative_third_cumulant_with(None, p).unwrap()
        );
    }

    #[test]
    // Purpose
    // -------
    // `compute_all` notifies stages in pipeline order and adds the
    // theoretical stages only with a ground truth.
    //
    // Given
    // -----
    // - One run without ground truth, one with `R = I`.
    //
    // Expect
    // ------
    // - `[C, E_c, J, K_c, All]`, then `[C, E_c, J, K_c, C_th, K_c_th, All]`.
    fn compute_all_reports_stages_in_order() {
        let mut cumul = fixture();
        let sink = RecordingProgress::new();
        cumul.compute_all(None, &sink).unwrap();
        assert_eq!(
            sink.stages(),
            vec![
                Stage::Covariance,
                Stage::ThirdMoment,
                Stage::IntegratedIntensity,
                Stage::ThirdCumulant,
                Stage::All
            ]
        );

        let identity = Array2::<f64>::eye(3);
        cumul.set_ground_truth(identity.view().into()).unwrap();
        let sink = RecordingProgress::new();
        cumul.compute_all(None, &sink).unwrap();
        assert_eq!(sink.stages().len(), 7);
        assert_eq!(sink.stages()[4], Stage::TheoreticalCovariance);
        assert_eq!(sink.stages()[5], Stage::TheoreticalThirdCumulant);
        assert_eq!(
            cumul.theoretical_covariance().unwrap(),
            &Array2::from_diag(cumul.intensities())
        );
    }

    #[test]
    // Purpose
    // -------
    // `K_c` assembly follows both documented formulas.
    //
    // Given
    // -----
    // - `L = [1, 2]`, `C = [[1, 0.5], [0.5, 2]]`, `J = 0`, `h = 2`,
    //   `E0 = [[3, 1], [1, 6]]`, `E1 = [[3, 2], [0, 6]]`, so `M = 2C`.
    //
    // Expect
    // ------
    // - Reference `K[0,1] = (2·1 − 2·1 + 2 − 1·4) / 3 = −2/3`.
    // - Balanced `K[0,1] = (2·(1 − 2·1) + 2 − 1·4) / 3 = −4/3`.
    fn third_cumulant_assembly_follows_both_formulas() {
        let l = array![1.0, 2.0];
        let c = array![[1.0, 0.5], [0.5, 2.0]];
        let j = Array2::<f64>::zeros((2, 2));
        let e0 = array![[3.0, 1.0], [1.0, 6.0]];
        let e1 = array![[3.0, 2.0], [0.0, 6.0]];
        let e_c = Array3::from_shape_fn((2, 2, 2), |(i, jj, k)| {
            if k == 0 {
                e0[[i, jj]]
            } else {
                e1[[i, jj]]
            }
        });

        let reference =
            assemble_third_cumulant(l.view(), &c, &j, &e_c, 2.0, ThirdCumulantFormula::Reference);
        let balanced =
            assemble_third_cumulant(l.view(), &c, &j, &e_c, 2.0, ThirdCumulantFormula::Balanced);

        assert!((reference[[0, 1]] + 2.0 / 3.0).abs() < 1e-12);
        assert!((balanced[[0, 1]] + 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Reassigning the sequences drops derived arrays and recomputes `L`.
    //
    // Given
    // -----
    // - A session after `compute_all`, then new sequences.
    //
    // Expect
    // ------
    // - Every empirical accessor returns `None`; the ground truth survives.
    fn set_processes_clears_derived_arrays() {
        let mut cumul = fixture();
        let identity = Array2::<f64>::eye(3);
        cumul.set_ground_truth(identity.view().into()).unwrap();
        cumul.compute_all(None, &crate::cumulants::progress::SilentProgress).unwrap();

        cumul.set_processes(vec![
            EventSequence::new(vec![0.0, 1.0]).unwrap(),
            EventSequence::new(vec![0.0, 2.0]).unwrap(),
            EventSequence::empty(),
        ]);

        assert!(cumul.covariance().is_none());
        assert!(cumul.third_moment().is_none());
        assert!(cumul.integrated_intensity().is_none());
        assert!(cumul.third_cumulant().is_none());
        assert!(cumul.theoretical_covariance().is_none());
        assert!(cumul.ground_truth().is_some());
        assert_eq!(cumul.horizon(), 2.0);
        assert_eq!(cumul.intensities(), &array![1.0, 1.0, 0.0]);
    }

    #[test]
    // Purpose
    // -------
    // Reassigning sequences of a different dimension must not leave a stale
    // ground truth behind for the theoretical stages.
    //
    // Given
    // -----
    // - A 3-D session with `R = I₃`, reassigned to two sequences.
    //
    // Expect
    // ------
    // - The ground truth is dropped and `compute_all` returns `Ok`.
    // - `C_th` then reports `MissingGroundTruth` instead of panicking.
    fn set_processes_with_new_dimension_drops_ground_truth() {
        let mut cumul = fixture();
        cumul.set_ground_truth(Array2::<f64>::eye(3).view().into()).unwrap();

        cumul.set_processes(vec![
            EventSequence::new(vec![0.0, 1.0, 2.0, 3.0]).unwrap(),
            EventSequence::new(vec![0.5, 1.5, 2.5]).unwrap(),
        ]);
        let sink = RecordingProgress::new();
        cumul.compute_all(None, &sink).unwrap();

        assert_eq!(cumul.dim(), 2);
        assert!(cumul.ground_truth().is_none());
        assert!(!sink.stages().contains(&Stage::TheoreticalCovariance));
        assert_eq!(
            cumul.compute_theoretical_covariance().unwrap_err(),
            CumulantError::MissingGroundTruth { requested: Stage::TheoreticalCovariance }
        );
    }

    #[test]
    // Purpose
    // -------
    // Changing the trend convention or the formula drops the arrays built
    // under the previous flags, so they cannot be mixed.
    //
    // Given
    // -----
    // - A fully computed reference session; the formula then the trend is
    //   switched.
    //
    // Expect
    // ------
    // - Formula change: `K_c` cleared, `E_c` and `C` kept.
    // - Trend change: `E_c` and `K_c` cleared; recomputing gives the same
    //   `K_c` as a fresh session built with the new flags.
    fn set_options_clears_arrays_built_under_other_flags() {
        use crate::cumulants::{options::TrendConvention, progress::SilentProgress};

        let mut cumul = fixture();
        cumul.compute_all(None, &SilentProgress).unwrap();

        cumul.set_options(cumul.options().with_formula(ThirdCumulantFormula::Balanced));
        assert!(cumul.third_cumulant().is_none());
        assert!(cumul.third_moment().is_some());
        assert!(cumul.covariance().is_some());

        cumul.set_options(cumul.options().with_trend(TrendConvention::Corrected));
        assert!(cumul.third_moment().is_none());
        assert!(cumul.third_cumulant().is_none());
        assert!(cumul.covariance().is_some());

        cumul.compute_third_moment_tensor(None).unwrap();
        let k_c = cumul.compute_empirical_third_cumulant(None).unwrap().clone();
        let mut fresh = Cumulants::new(cumul.process().clone(), *cumul.options());
        fresh.compute_all(None, &SilentProgress).unwrap();
        assert_eq!(Some(&k_c), fresh.third_cumulant());
    }

    #[test]
    // Purpose
    // -------
    // The theoretical third cumulant needs `C_th` first.
    //
    // Given
    // -----
    // - A session with a ground truth but no `C_th`; a session without one.
    //
    // Expect
    // ------
    // - `MissingPrerequisite { K_c_th, C_th }` and `MissingGroundTruth`.
    fn theoretical_stages_check_their_inputs() {
        let mut cumul = fixture();
        assert_eq!(
            cumul.compute_theoretical_covariance().unwrap_err(),
            CumulantError::MissingGroundTruth { requested: Stage::TheoreticalCovariance }
        );

        let identity = Array2::<f64>::eye(3);
        cumul.set_ground_truth(identity.view().into()).unwrap();

        assert_eq!(
            cumul.compute_theoretical_third_cumulant().unwrap_err(),
            CumulantError::MissingPrerequisite {
                requested: Stage::TheoreticalThirdCumulant,
                missing: Stage::TheoreticalCovariance
            }
        );
    }

    #[test]
    // Purpose
    // -------
    // All-empty input yields finite zero statistics rather than a division by
    // zero.
    //
    // Given
    // -----
    // - Two empty sequences.
    //
    // Expect
    // ------
    // - `C`, `J` and `K_c` are all zero.
    fn all_empty_input_yields_zero_statistics() {
        let options = CumulantOptions::default();
        let mut cumul = Cumulants::from_sequences(vec![vec![], vec![]], options).unwrap();

        cumul.compute_all(None, &crate::cumulants::progress::SilentProgress).unwrap();

        let zeros = Array2::<f64>::zeros((2, 2));
        assert_eq!(cumul.covariance().unwrap(), &zeros);
        assert_eq!(cumul.integrated_intensity().unwrap(), &zeros);
        assert_eq!(cumul.third_cumulant().unwrap(), &zeros);
    }

    #[test]
    fn moments_require_covariance_and_third_cumulant() {
        let mut cumul = fixture();
        assert!(cumul.moments().is_err());

        cumul.compute_all(None, &crate::cumulants::progress::SilentProgress).unwrap();
        let moments = cumul.moments().unwrap();

        assert_eq!(&moments.intensities, cumul.intensities());
        assert_eq!(moments.covariance.dim(), (3, 3));
    }

    #[test]
    fn invalid_bandwidth_is_rejected_before_any_work() {
        let mut cumul = fixture();

        let err = cumul.compute_covariance(Some(-1.0)).unwrap_err();

        assert!(matches!(err, CumulantError::InvalidBandwidth { .. }));
        assert!(cumul.covariance().is_none());
    }
}
