//! Persisted cumulant bundle.
//!
//! [`CumulantBundle`] is the on-disk JSON form of a session: the event
//! sequences, the bandwidth default, and whichever of `L`, `C`, `J`, `E_c`,
//! `K_c` and the ground truth `R` were available. Restoring a bundle rebuilds
//! the process collection from the sequences (so `T` and `L` are derived, not
//! trusted) and reinstalls the stored arrays after checking their shapes.
//!
//! Field names are snake_case; the camelCase names `eventSequences` and
//! `hMax` used by older dumps are accepted on input.
use std::{fs, path::Path};

use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::{
    cumulants::{
        engine::Cumulants,
        errors::{CumulantError, CumulantResult},
        options::{CumulantOptions, ExecutionStrategy},
    },
    process::ProcessCollection,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulantBundle {
    pub dim: usize,
    #[serde(alias = "hMax")]
    pub h_max: f64,
    #[serde(alias = "eventSequences")]
    pub sequences: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensities: Option<Array1<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covariance: Option<Array2<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrated_intensity: Option<Array2<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_moment: Option<Array3<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_cumulant: Option<Array2<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<Array2<f64>>,
}

impl CumulantBundle {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    /// [`CumulantError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> CumulantResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    /// [`CumulantError::Serialization`] for malformed JSON or missing fields.
    pub fn from_json(json: &str) -> CumulantResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// [`CumulantError::Serialization`] or [`CumulantError::Io`].
    pub fn write_json(&self, path: impl AsRef<Path>) -> CumulantResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// # Errors
    /// [`CumulantError::Io`] or [`CumulantError::Serialization`].
    pub fn read_json(path: impl AsRef<Path>) -> CumulantResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl Cumulants {
    /// Snapshot of the sequences and every stored empirical array.
    pub fn to_bundle(&self) -> CumulantBundle {
        CumulantBundle {
            dim: self.dim(),
            h_max: self.options().h_max(),
            sequences: self.process().sequences().iter().map(|s| s.as_slice().to_vec()).collect(),
            intensities: Some(self.intensities().clone()),
            covariance: self.covariance().cloned(),
            integrated_intensity: self.integrated_intensity().cloned(),
            third_moment: self.third_moment().cloned(),
            third_cumulant: self.third_cumulant().cloned(),
            ground_truth: self.ground_truth().cloned(),
        }
    }

    /// Rebuild a session from a bundle using the default execution strategy.
    ///
    /// # Errors
    /// - [`CumulantError::InvalidBandwidth`] for an invalid `h_max`.
    /// - [`CumulantError::InvalidProcess`] for invalid sequences.
    /// - [`CumulantError::DimensionMismatch`] when `dim` or an array shape
    ///   disagrees with the sequences.
    pub fn from_bundle(bundle: CumulantBundle) -> CumulantResult<Self> {
        let options = CumulantOptions::new(bundle.h_max, ExecutionStrategy::default())?;
        let d = bundle.sequences.len();
        if bundle.dim != d {
            return Err(CumulantError::DimensionMismatch {
                what: "dim",
                expected: vec![d],
                found: vec![bundle.dim],
            });
        }
        if let Some(l) = &bundle.intensities {
            check_shape("intensities", l.shape(), &[d])?;
        }
        for (what, m) in [
            ("covariance", &bundle.covariance),
            ("integrated_intensity", &bundle.integrated_intensity),
            ("third_cumulant", &bundle.third_cumulant),
        ] {
            if let Some(m) = m {
                check_shape(what, m.shape(), &[d, d])?;
            }
        }
        if let Some(e) = &bundle.third_moment {
            check_shape("third_moment", e.shape(), &[d, d, 2])?;
        }

        let process = ProcessCollection::from_vecs(bundle.sequences)?;
        let mut cumul = Cumulants::new(process, options);
        if let Some(r) = &bundle.ground_truth {
            cumul.set_ground_truth(r.view().into())?;
        }
        cumul.restore_arrays(
            bundle.covariance,
            bundle.integrated_intensity,
            bundle.third_moment,
            bundle.third_cumulant,
        );
        Ok(cumul)
    }
}

fn check_shape(what: &'static str, found: &[usize], expected: &[usize]) -> CumulantResult<()> {
    if found != expected {
        return Err(CumulantError::DimensionMismatch {
            what,
            expected: expected.to_vec(),
            found: found.to_vec(),
        });
    }
    Ok(())
}
