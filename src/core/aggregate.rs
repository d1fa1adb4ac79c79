use crate::domain::model::{round2, AggregateEntry, AggregateReport, FrameReport, ImageUpload};
use crate::domain::ports::{FrameEstimator, Segmenter};
use crate::utils::error::{GramsError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

#[derive(Debug, Default)]
struct Accumulator {
    weight: f64,
    volume: f64,
    calories: f64,
    count: usize,
}

/// Fuses per-frame reports by exact food label.
///
/// Each label's weight, volume and calories are averaged independently over
/// the items carrying it. Output order is first-seen order across `reports`.
pub fn fuse_reports(reports: &[FrameReport]) -> AggregateReport {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();

    for item in reports.iter().flat_map(|r| r.results.iter()) {
        let acc = groups.entry(item.food.as_str()).or_insert_with(|| {
            order.push(item.food.clone());
            Accumulator::default()
        });
        acc.weight += item.weight_g;
        acc.volume += item.volume_cm3;
        acc.calories += item.calories as f64;
        acc.count += 1;
    }

    let results = order
        .into_iter()
        .filter_map(|food| {
            let acc = groups.get(food.as_str())?;
            let n = acc.count as f64;
            Some(AggregateEntry {
                weight_g: round2(acc.weight / n),
                volume_cm3: round2(acc.volume / n),
                calories: (acc.calories / n).trunc() as u64,
                food,
            })
        })
        .collect();

    AggregateReport { results }
}

/// Segments and estimates 1..=`max_images` images concurrently, then fuses
/// whatever frames succeeded.
#[derive(Clone)]
pub struct Aggregator {
    segmenter: Arc<dyn Segmenter>,
    estimator: Arc<dyn FrameEstimator>,
    max_images: usize,
}

impl Aggregator {
    pub fn new(
        segmenter: Arc<dyn Segmenter>,
        estimator: Arc<dyn FrameEstimator>,
        max_images: usize,
    ) -> Self {
        Self {
            segmenter,
            estimator,
            max_images,
        }
    }

    pub fn max_images(&self) -> usize {
        self.max_images
    }

    pub async fn aggregate(&self, images: Vec<ImageUpload>) -> Result<AggregateReport> {
        if images.is_empty() {
            return Err(GramsError::invalid_input("no images provided"));
        }
        if images.len() > self.max_images {
            return Err(GramsError::invalid_input(format!(
                "at most {} images per request, got {}",
                self.max_images,
                images.len()
            )));
        }

        let attempted = images.len();
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, FrameReport)>();
        let mut tasks = JoinSet::new();

        for (index, image) in images.into_iter().enumerate() {
            let segmenter = Arc::clone(&self.segmenter);
            let estimator = Arc::clone(&self.estimator);
            let tx = tx.clone();

            tasks.spawn(async move {
                match process_frame(segmenter.as_ref(), estimator.as_ref(), &image).await {
                    Ok(report) => {
                        tracing::debug!(
                            "Frame {} ({}) produced {} item(s)",
                            index,
                            image.filename,
                            report.results.len()
                        );
                        // receiver outlives every task
                        let _ = tx.send((index, report));
                    }
                    Err(e) => {
                        tracing::warn!("Dropping frame {} ({}): {}", index, image.filename, e);
                    }
                }
            });
        }
        drop(tx);

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Frame task failed to complete: {}", e);
            }
        }

        let mut completed = Vec::with_capacity(attempted);
        while let Some(entry) = rx.recv().await {
            completed.push(entry);
        }

        if completed.is_empty() {
            tracing::error!("All {} frame(s) failed", attempted);
            return Err(GramsError::NoUsableInput { attempted });
        }

        // 依提交順序排列
        completed.sort_by_key(|(index, _)| *index);
        let reports: Vec<FrameReport> = completed.into_iter().map(|(_, r)| r).collect();

        tracing::info!("Fusing {} of {} frame(s)", reports.len(), attempted);
        Ok(fuse_reports(&reports))
    }
}

async fn process_frame(
    segmenter: &dyn Segmenter,
    estimator: &dyn FrameEstimator,
    image: &ImageUpload,
) -> Result<FrameReport> {
    let segmentation = segmenter.segment(image).await?;
    estimator.estimate(&segmentation).await
}
