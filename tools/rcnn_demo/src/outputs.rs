use std::{fs, path::Path};

use detection::ImageInfo;
use ndarray::{Array2, s};
use serde::Deserialize;

use crate::{
    dataset::Dataset,
    error::{Error, Result},
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutputs {
    rois: Vec<Vec<f32>>,
    scores: Vec<Vec<f32>>,
    bbox_deltas: Vec<Vec<f32>>,
    #[serde(default)]
    im_info: Option<Vec<f32>>,
}

/// The outputs of the network for a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOutputs {
    /// Region proposals, shape `[N, 4]`, in resized image coordinates.
    pub rois: Array2<f32>,
    /// Class scores, shape `[N, C]`.
    pub scores: Array2<f32>,
    /// Regression deltas, shape `[N, 4 * C]`.
    pub bbox_deltas: Array2<f32>,
    pub im_info: Option<ImageInfo>,
}

impl NetworkOutputs {
    /// Read the outputs from a JSON file.
    pub fn load(path: &Path, dataset: Dataset) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&contents, dataset)
    }

    /// Parse the outputs, checking every row against the class count of `dataset`.
    ///
    /// The ROIs are expected with their batch index in the first column, which is dropped.
    pub fn from_json(json: &str, dataset: Dataset) -> Result<Self> {
        let raw: RawOutputs = serde_json::from_str(json)?;
        let num_classes = dataset.num_classes();

        let rois = to_array("rois", &raw.rois, 5)?.slice(s![.., 1..]).to_owned();

        let score_width = raw.scores.first().map_or(num_classes, Vec::len);
        if score_width != num_classes {
            return Err(Error::ClassCount {
                dataset,
                expected: num_classes,
                actual: score_width,
            });
        }
        let scores = to_array("scores", &raw.scores, num_classes)?;
        let bbox_deltas = to_array("bbox_deltas", &raw.bbox_deltas, 4 * num_classes)?;

        let im_info = raw
            .im_info
            .as_deref()
            .map(ImageInfo::from_slice)
            .transpose()?;

        Ok(Self {
            rois,
            scores,
            bbox_deltas,
            im_info,
        })
    }
}

fn to_array(what: &'static str, rows: &[Vec<f32>], width: usize) -> Result<Array2<f32>> {
    if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(Error::InvalidOutputs {
            what,
            row,
            expected: width,
            actual: values.len(),
        });
    }

    Ok(Array2::from_shape_fn((rows.len(), width), |(i, j)| {
        rows[i][j]
    }))
}
