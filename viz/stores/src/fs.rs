use std::fs::File;
use std::path::{Path, PathBuf};

use futures::FutureExt;
use nalgebra::Vector3;
use subsurface::ensemble::{EnsembleIdent, EnsembleSummary};
use subsurface::seismic::{DepthSlice, SeismicCubeMeta};
use subsurface::surface::{RegularSurface, SurfaceMeta};
use subsurface::wellbore::{WellboreHeader, WellborePick};
use itertools::Itertools;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use util::source::Source;

use crate::address::{SeismicSliceAddress, SurfaceAddress, WellborePicksAddress};
use crate::error::StoreError;
use crate::traits::{SeismicStore, StoreFuture, SurfaceStore, WellboreStore};

/// A backend over a dataset directory.
///
/// Layout:
/// ```text
/// <root>/ensembles.json
/// <root>/surfaces/<case>__<ensemble>/directory.json
/// <root>/surfaces/<case>__<ensemble>/r<N>__<name>__<attribute>__<time>.json
/// <root>/seismic/<case>__<ensemble>/directory.json
/// <root>/seismic/<case>__<ensemble>/r<N>__<attribute>__<time>__d<depth>.json
/// <root>/wellbores/<field>/headers.json
/// <root>/wellbores/<field>/picks.csv
/// ```
///
/// Files are small enough that the reads happen inline on the async task.
pub struct FsBackend {
    root: PathBuf,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct PickRecord {
    pub wellbore: String,
    pub pick_name: String,
    pub md: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FsBackend {
    pub fn try_from_source(source: &Source) -> Result<Self, anyhow::Error> {
        let root = source.path()?;
        if !root.is_dir() {
            anyhow::bail!("Dataset root is not a directory. path: {}", root.display());
        }
        Ok(Self {
            root,
        })
    }

    /// The ensemble summaries of the dataset, used to seed global settings.
    #[tracing::instrument(level = Level::DEBUG, skip(self))]
    pub fn load_ensembles(&self) -> Result<Vec<EnsembleSummary>, anyhow::Error> {
        let path = self.root.join("ensembles.json");
        info!("Loading ensembles. file: {}", path.display());

        let file = File::open(&path)?;
        let ensembles = serde_json::from_reader(file)?;
        Ok(ensembles)
    }

    fn ensemble_directory(root: &Path, section: &str, ensemble: &EnsembleIdent) -> PathBuf {
        root.join(section)
            .join(format!("{}__{}", ensemble.case_name, ensemble.ensemble_name))
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    fn read_picks(path: &Path) -> Result<Vec<PickRecord>, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records = vec![];
        for result in reader.deserialize() {
            let record: PickRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    fn guard(cancellation: &CancellationToken) -> Result<(), StoreError> {
        if cancellation.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(())
    }
}

impl SurfaceStore for FsBackend {
    #[tracing::instrument(level = Level::DEBUG, skip(self, cancellation))]
    fn surface_directory(
        &self,
        ensemble: &EnsembleIdent,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<SurfaceMeta>> {
        let path = Self::ensemble_directory(&self.root, "surfaces", ensemble).join("directory.json");
        async move {
            Self::guard(&cancellation)?;
            Self::read_json(&path)
        }
        .boxed()
    }

    #[tracing::instrument(level = Level::DEBUG, skip(self, cancellation))]
    fn regular_surface(&self, address: &SurfaceAddress, cancellation: CancellationToken) -> StoreFuture<RegularSurface> {
        let file_name = format!(
            "r{}__{}__{}__{}.json",
            address.realization, address.name, address.attribute, address.time
        );
        let path = Self::ensemble_directory(&self.root, "surfaces", &address.ensemble).join(file_name);
        async move {
            Self::guard(&cancellation)?;
            Self::read_json(&path)
        }
        .boxed()
    }
}

impl SeismicStore for FsBackend {
    #[tracing::instrument(level = Level::DEBUG, skip(self, cancellation))]
    fn seismic_directory(
        &self,
        ensemble: &EnsembleIdent,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<SeismicCubeMeta>> {
        let path = Self::ensemble_directory(&self.root, "seismic", ensemble).join("directory.json");
        async move {
            Self::guard(&cancellation)?;
            Self::read_json(&path)
        }
        .boxed()
    }

    #[tracing::instrument(level = Level::DEBUG, skip(self, cancellation))]
    fn depth_slice(&self, address: &SeismicSliceAddress, cancellation: CancellationToken) -> StoreFuture<DepthSlice> {
        let file_name = format!(
            "r{}__{}__{}__d{:.0}.json",
            address.realization, address.attribute, address.time, address.depth
        );
        let path = Self::ensemble_directory(&self.root, "seismic", &address.ensemble).join(file_name);
        async move {
            Self::guard(&cancellation)?;
            Self::read_json(&path)
        }
        .boxed()
    }
}

impl WellboreStore for FsBackend {
    #[tracing::instrument(level = Level::DEBUG, skip(self, cancellation))]
    fn wellbore_directory(&self, field: &str, cancellation: CancellationToken) -> StoreFuture<Vec<WellboreHeader>> {
        let path = self
            .root
            .join("wellbores")
            .join(field)
            .join("headers.json");
        async move {
            Self::guard(&cancellation)?;
            Self::read_json(&path)
        }
        .boxed()
    }

    #[tracing::instrument(level = Level::DEBUG, skip(self, cancellation))]
    fn pick_identifiers(&self, field: &str, cancellation: CancellationToken) -> StoreFuture<Vec<String>> {
        let path = self
            .root
            .join("wellbores")
            .join(field)
            .join("picks.csv");
        async move {
            Self::guard(&cancellation)?;
            let records = Self::read_picks(&path)?;
            Ok(records
                .into_iter()
                .map(|record| record.pick_name)
                .unique()
                .collect())
        }
        .boxed()
    }

    #[tracing::instrument(level = Level::DEBUG, skip(self, cancellation))]
    fn picks_for_surface(
        &self,
        address: &WellborePicksAddress,
        cancellation: CancellationToken,
    ) -> StoreFuture<Vec<WellborePick>> {
        let path = self
            .root
            .join("wellbores")
            .join(&address.field)
            .join("picks.csv");
        let pick_name = address.pick_name.clone();
        let wellbores = address.wellbores.clone();
        async move {
            Self::guard(&cancellation)?;
            let records = Self::read_picks(&path)?;
            Ok(records
                .into_iter()
                .filter(|record| record.pick_name == pick_name && wellbores.contains(&record.wellbore))
                .map(|record| WellborePick {
                    wellbore: record.wellbore,
                    pick_name: record.pick_name,
                    md: record.md,
                    location: Vector3::new(record.x, record.y, record.z),
                })
                .collect())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use subsurface::surface::TimeOrInterval;
    use tempfile::tempdir;
    use util::test::write_json_file;

    use super::*;

    fn build_dataset(root: &Path) -> Result<(), anyhow::Error> {
        let ensemble = EnsembleIdent::new("case", "iter-0");

        let surfaces_dir = FsBackend::ensemble_directory(root, "surfaces", &ensemble);
        std::fs::create_dir_all(&surfaces_dir)?;

        write_json_file(&surfaces_dir.join("directory.json"), &vec![SurfaceMeta {
            name: "TopVolantis".to_string(),
            attribute: "depth".to_string(),
            time: TimeOrInterval::NoTime,
        }])?;

        let surface = RegularSurface::new(2, 2, 0.0, 0.0, 50.0, 50.0, 0.0, vec![
            1500.0, 1510.0, 1520.0, 1530.0,
        ])?;
        write_json_file(&surfaces_dir.join("r0__TopVolantis__depth__static.json"), &surface)?;

        let wellbores_dir = root.join("wellbores").join("DROGON");
        std::fs::create_dir_all(&wellbores_dir)?;
        write_json_file(&wellbores_dir.join("headers.json"), &vec![WellboreHeader {
            name: "55/33-A-1".to_string(),
            total_depth: 2800.0,
        }])?;

        let mut picks = std::fs::File::create(wellbores_dir.join("picks.csv"))?;
        writeln!(picks, "wellbore,pick_name,md,x,y,z")?;
        writeln!(picks, "55/33-A-1,TopVolantis,2500.0,100.0,200.0,1500.0")?;
        writeln!(picks, "55/33-A-2,TopVolantis,2600.0,150.0,250.0,1520.0")?;
        writeln!(picks, "55/33-A-1,BaseVolantis,2700.0,100.0,200.0,1700.0")?;

        Ok(())
    }

    #[tokio::test]
    async fn test_load_surface_directory_and_surface() -> Result<(), anyhow::Error> {
        // given
        let temp_dir = tempdir()?;
        build_dataset(temp_dir.path())?;
        let backend = FsBackend::try_from_source(&Source::try_from_directory_path(temp_dir.path().to_path_buf())?)?;

        let ensemble = EnsembleIdent::new("case", "iter-0");

        // when
        let directory = backend
            .surface_directory(&ensemble, CancellationToken::new())
            .await?;

        // then
        assert_eq!(directory.len(), 1);
        assert_eq!(directory[0].attribute, "depth");

        // when
        let surface = backend
            .regular_surface(
                &SurfaceAddress {
                    ensemble,
                    realization: subsurface::ensemble::RealizationNumber(0),
                    name: "TopVolantis".to_string(),
                    attribute: "depth".to_string(),
                    time: TimeOrInterval::NoTime,
                },
                CancellationToken::new(),
            )
            .await?;

        // then
        assert_eq!(surface.ncol, 2);
        assert_eq!(surface.values().len(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_picks_are_filtered_by_pick_name_and_wellbores() -> Result<(), anyhow::Error> {
        // given
        let temp_dir = tempdir()?;
        build_dataset(temp_dir.path())?;
        let backend = FsBackend::try_from_source(&Source::try_from_directory_path(temp_dir.path().to_path_buf())?)?;

        // when
        let identifiers = backend
            .pick_identifiers("DROGON", CancellationToken::new())
            .await?;

        // then
        assert_eq!(identifiers, vec!["TopVolantis".to_string(), "BaseVolantis".to_string()]);

        // when
        let picks = backend
            .picks_for_surface(
                &WellborePicksAddress {
                    field: "DROGON".to_string(),
                    pick_name: "TopVolantis".to_string(),
                    wellbores: vec!["55/33-A-1".to_string()],
                },
                CancellationToken::new(),
            )
            .await?;

        // then
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].wellbore, "55/33-A-1");
        assert_eq!(picks[0].location.z, 1500.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_dataset_entry_is_not_found() -> Result<(), anyhow::Error> {
        // given an empty dataset
        let temp_dir = tempdir()?;
        let backend = FsBackend::try_from_source(&Source::try_from_directory_path(temp_dir.path().to_path_buf())?)?;

        // when
        let result = backend
            .surface_directory(&EnsembleIdent::new("case", "iter-0"), CancellationToken::new())
            .await;

        // then
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        Ok(())
    }
}
