//! libsvm text-format support vector regression

use crate::{ModelError, QualityRegressor};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// libsvm `svm_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvmType {
    CSvc,
    NuSvc,
    OneClass,
    EpsilonSvr,
    NuSvr,
}

impl SvmType {
    #[must_use]
    pub fn is_regression(self) -> bool {
        matches!(self, SvmType::EpsilonSvr | SvmType::NuSvr)
    }
}

impl FromStr for SvmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "c_svc" => Ok(SvmType::CSvc),
            "nu_svc" => Ok(SvmType::NuSvc),
            "one_class" => Ok(SvmType::OneClass),
            "epsilon_svr" => Ok(SvmType::EpsilonSvr),
            "nu_svr" => Ok(SvmType::NuSvr),
            other => Err(format!("unknown svm_type '{other}'")),
        }
    }
}

impl fmt::Display for SvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SvmType::CSvc => "c_svc",
            SvmType::NuSvc => "nu_svc",
            SvmType::OneClass => "one_class",
            SvmType::EpsilonSvr => "epsilon_svr",
            SvmType::NuSvr => "nu_svr",
        };
        f.write_str(name)
    }
}

/// Kernel function with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Linear,
    Polynomial { gamma: f64, coef0: f64, degree: i32 },
    Rbf { gamma: f64 },
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Kernel {
    /// Evaluate the kernel between a dense vector (feature `i` has libsvm
    /// index `i + 1`) and a sparse support vector
    #[must_use]
    pub fn evaluate(&self, x: &[f64], sv: &[(u32, f64)]) -> f64 {
        match *self {
            Kernel::Linear => dot(x, sv),
            Kernel::Polynomial {
                gamma,
                coef0,
                degree,
            } => (gamma * dot(x, sv) + coef0).powi(degree),
            Kernel::Rbf { gamma } => (-gamma * squared_distance(x, sv)).exp(),
            Kernel::Sigmoid { gamma, coef0 } => (gamma * dot(x, sv) + coef0).tanh(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Kernel::Linear => "linear",
            Kernel::Polynomial { .. } => "polynomial",
            Kernel::Rbf { .. } => "rbf",
            Kernel::Sigmoid { .. } => "sigmoid",
        }
    }
}

fn dot(x: &[f64], sv: &[(u32, f64)]) -> f64 {
    let mut sum = 0.0;
    for &(index, value) in sv {
        let Some(i) = (index as usize).checked_sub(1) else {
            continue;
        };
        match x.get(i) {
            Some(xi) => sum += xi * value,
            None => break,
        }
    }
    sum
}

/// `||x - sv||^2` merged in index order; missing entries are zero and
/// index 0 (not a libsvm index) is skipped
fn squared_distance(x: &[f64], sv: &[(u32, f64)]) -> f64 {
    let mut sum = 0.0;
    let mut next = 0usize;
    for &(index, value) in sv {
        let Some(i) = (index as usize).checked_sub(1) else {
            continue;
        };
        while next < i && next < x.len() {
            sum += x[next] * x[next];
            next += 1;
        }
        if i < x.len() {
            let d = x[i] - value;
            sum += d * d;
            next = i + 1;
        } else {
            sum += value * value;
        }
    }
    while next < x.len() {
        sum += x[next] * x[next];
        next += 1;
    }
    sum
}

/// One support vector: its dual coefficient and sparse `(index, value)` entries
#[derive(Debug, Clone, PartialEq)]
pub struct SupportVector {
    pub coef: f64,
    pub nodes: Vec<(u32, f64)>,
}

/// A trained epsilon-SVR or nu-SVR model
#[derive(Debug, Clone, PartialEq)]
pub struct SvmModel {
    svm_type: SvmType,
    kernel: Kernel,
    rho: f64,
    support_vectors: Vec<SupportVector>,
}

impl SvmModel {
    /// Build a model directly from its parts
    ///
    /// # Errors
    /// Returns `Unsupported` for non-regression model types.
    pub fn new(
        svm_type: SvmType,
        kernel: Kernel,
        rho: f64,
        support_vectors: Vec<SupportVector>,
    ) -> Result<Self, ModelError> {
        if !svm_type.is_regression() {
            return Err(ModelError::Unsupported(format!(
                "svm_type {svm_type} is not a regression model"
            )));
        }
        Ok(Self {
            svm_type,
            kernel,
            rho,
            support_vectors,
        })
    }

    /// Load a libsvm model file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is malformed, or is not
    /// a regression model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let model: SvmModel = text.parse()?;
        info!(
            "Loaded {} model from {} ({} support vectors, {} kernel)",
            model.svm_type,
            path.display(),
            model.support_vectors.len(),
            model.kernel.name()
        );
        Ok(model)
    }

    #[must_use]
    pub fn svm_type(&self) -> SvmType {
        self.svm_type
    }

    #[must_use]
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    #[must_use]
    pub fn rho(&self) -> f64 {
        self.rho
    }

    #[must_use]
    pub fn support_vectors(&self) -> &[SupportVector] {
        &self.support_vectors
    }

    /// `sum(coef_i * K(x, sv_i)) - rho`
    #[must_use]
    pub fn decision_value(&self, x: &[f64]) -> f64 {
        let mut sum = 0.0;
        for sv in &self.support_vectors {
            sum += sv.coef * self.kernel.evaluate(x, &sv.nodes);
        }
        sum - self.rho
    }
}

impl QualityRegressor for SvmModel {
    fn predict(&self, scaled_features: &[f64]) -> f64 {
        self.decision_value(scaled_features)
    }
}

#[derive(Default)]
struct Header {
    svm_type: Option<SvmType>,
    kernel_type: Option<String>,
    degree: i32,
    gamma: f64,
    coef0: f64,
    total_sv: Option<usize>,
    rho: Option<f64>,
}

fn parse_value<T: FromStr>(line: usize, key: &str, token: Option<&str>) -> Result<T, ModelError> {
    let token = token.ok_or_else(|| ModelError::parse(line, format!("missing value for {key}")))?;
    token
        .parse()
        .map_err(|_| ModelError::parse(line, format!("invalid value '{token}' for {key}")))
}

impl Header {
    fn kernel(&self, line: usize) -> Result<Kernel, ModelError> {
        let name = self
            .kernel_type
            .as_deref()
            .ok_or_else(|| ModelError::parse(line, "missing kernel_type"))?;
        match name {
            "linear" => Ok(Kernel::Linear),
            "polynomial" => Ok(Kernel::Polynomial {
                gamma: self.gamma,
                coef0: self.coef0,
                degree: self.degree,
            }),
            "rbf" => Ok(Kernel::Rbf { gamma: self.gamma }),
            "sigmoid" => Ok(Kernel::Sigmoid {
                gamma: self.gamma,
                coef0: self.coef0,
            }),
            "precomputed" => Err(ModelError::Unsupported(
                "precomputed kernels need the training data".to_string(),
            )),
            other => Err(ModelError::parse(line, format!("unknown kernel_type '{other}'"))),
        }
    }
}

fn parse_support_vector(line: usize, text: &str) -> Result<SupportVector, ModelError> {
    let mut tokens = text.split_whitespace();
    let coef = parse_value(line, "coefficient", tokens.next())?;

    let mut nodes = Vec::new();
    let mut last_index = 0u32;
    for token in tokens {
        let (index, value) = token
            .split_once(':')
            .ok_or_else(|| ModelError::parse(line, format!("expected index:value, got '{token}'")))?;
        let index: u32 = parse_value(line, "feature index", Some(index))?;
        if index <= last_index {
            return Err(ModelError::parse(
                line,
                format!("feature indices must be positive and increasing (got {index})"),
            ));
        }
        let value: f64 = parse_value(line, "feature value", Some(value))?;
        nodes.push((index, value));
        last_index = index;
    }
    Ok(SupportVector { coef, nodes })
}

impl FromStr for SvmModel {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, ModelError> {
        let mut header = Header {
            degree: 3,
            ..Header::default()
        };
        let mut lines = text.lines().enumerate().map(|(n, l)| (n + 1, l));
        let mut sv_start = None;

        for (line, content) in lines.by_ref() {
            let mut tokens = content.split_whitespace();
            let Some(key) = tokens.next() else { continue };
            match key {
                "svm_type" => {
                    let name: String = parse_value(line, key, tokens.next())?;
                    header.svm_type = Some(name.parse().map_err(|e| ModelError::parse(line, e))?);
                }
                "kernel_type" => header.kernel_type = Some(parse_value(line, key, tokens.next())?),
                "degree" => header.degree = parse_value(line, key, tokens.next())?,
                "gamma" => header.gamma = parse_value(line, key, tokens.next())?,
                "coef0" => header.coef0 = parse_value(line, key, tokens.next())?,
                "total_sv" => header.total_sv = Some(parse_value(line, key, tokens.next())?),
                // Regression models carry a single rho
                "rho" => header.rho = Some(parse_value(line, key, tokens.next())?),
                // Classification-only metadata
                "nr_class" | "label" | "probA" | "probB" | "nr_sv" | "prob_density_marks" => {}
                "SV" => {
                    sv_start = Some(line);
                    break;
                }
                other => {
                    return Err(ModelError::parse(line, format!("unknown header key '{other}'")));
                }
            }
        }

        let sv_line = sv_start.ok_or_else(|| ModelError::parse(0, "missing SV section"))?;
        let svm_type = header
            .svm_type
            .ok_or_else(|| ModelError::parse(sv_line, "missing svm_type"))?;
        let kernel = header.kernel(sv_line)?;
        let total_sv = header
            .total_sv
            .ok_or_else(|| ModelError::parse(sv_line, "missing total_sv"))?;
        let rho = header
            .rho
            .ok_or_else(|| ModelError::parse(sv_line, "missing rho"))?;

        if !svm_type.is_regression() {
            return Err(ModelError::Unsupported(format!(
                "svm_type {svm_type} is not a regression model"
            )));
        }

        let mut support_vectors = Vec::with_capacity(total_sv);
        let mut last_line = sv_line;
        for (line, content) in lines {
            last_line = line;
            if content.trim().is_empty() {
                continue;
            }
            support_vectors.push(parse_support_vector(line, content)?);
        }

        if support_vectors.len() != total_sv {
            return Err(ModelError::parse(
                last_line,
                format!(
                    "total_sv is {} but {} support vectors were found",
                    total_sv,
                    support_vectors.len()
                ),
            ));
        }

        debug!(
            "Parsed {} model: {} kernel, rho={}",
            svm_type,
            kernel.name(),
            rho
        );

        SvmModel::new(svm_type, kernel, rho, support_vectors)
    }
}
