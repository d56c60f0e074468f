use futures::FutureExt;
use nalgebra::Vector3;
use subsurface::ensemble::{EnsembleIdent, EnsembleSummary, RealizationNumber};
use subsurface::seismic::{DepthSlice, SeismicCubeMeta};
use subsurface::surface::{RegularSurface, SurfaceMeta, TimeOrInterval};
use subsurface::wellbore::{WellboreHeader, WellborePick};
use tokio_util::sync::CancellationToken;

use crate::address::{SeismicSliceAddress, SurfaceAddress, WellborePicksAddress};
use crate::error::StoreError;
use crate::traits::{SeismicStore, StoreFuture, SurfaceStore, WellboreStore};

const SURFACE_NAMES: [&str; 2] = ["TopVolantis", "BaseVolantis"];
const SURFACE_ATTRIBUTES: [&str; 2] = ["depth", "thickness"];
const SEISMIC_ATTRIBUTE: &str = "amplitude";
const WELLBORES: [&str; 3] = ["55/33-A-1", "55/33-A-2", "55/33-A-3"];

/// Procedurally generated demo data; everything is a deterministic function
/// of the requested address, so no dataset files are needed.
pub struct SyntheticBackend {
    field: String,
    ensembles: Vec<EnsembleSummary>,
    ncol: u32,
    nrow: u32,
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self {
            field: "DROGON".to_string(),
            ensembles: vec![
                EnsembleSummary {
                    ident: EnsembleIdent::new("01_drogon_ahm", "iter-0"),
                    realizations: (0..3).map(RealizationNumber).collect(),
                },
                EnsembleSummary {
                    ident: EnsembleIdent::new("01_drogon_ahm", "iter-3"),
                    realizations: (0..2).map(RealizationNumber).collect(),
                },
            ],
            ncol: 32,
            nrow: 24,
        }
    }
}

impl SyntheticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn ensembles(&self) -> &[EnsembleSummary] {
        &self.ensembles
    }

    fn ensemble_known(&self, ensemble: &EnsembleIdent) -> Result<(), StoreError> {
        if self
            .ensembles
            .iter()
            .any(|summary| &summary.ident == ensemble)
        {
            Ok(())
        } else {
            Err(StoreError::NotFound(ensemble.to_string()))
        }
    }

    fn field_known(&self, field: &str) -> Result<(), StoreError> {
        if field == self.field {
            Ok(())
        } else {
            Err(StoreError::NotFound(field.to_string()))
        }
    }

    fn grid_values<F>(&self, value_at: F) -> Vec<f32>
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut values = Vec::with_capacity(self.ncol as usize * self.nrow as usize);
        for row in 0..self.nrow {
            for col in 0..self.ncol {
                let x = col as f64 / self.ncol.max(1) as f64;
                let y = row as f64 / self.nrow.max(1) as f64;
                values.push(value_at(x, y) as f32);
            }
        }
        values
    }

    fn build_surface(&self, address: &SurfaceAddress) -> Result<RegularSurface, StoreError> {
        let name_offset = SURFACE_NAMES
            .iter()
            .position(|name| *name == address.name)
            .ok_or_else(|| StoreError::NotFound(address.to_string()))? as f64
            * 150.0;
        let realization_offset = address.realization.0 as f64 * 7.0;

        let values = match address.attribute.as_str() {
            "depth" => self.grid_values(|x, y| {
                1500.0
                    + name_offset
                    + realization_offset
                    + 80.0 * (x * std::f64::consts::TAU).sin() * (y * std::f64::consts::TAU).cos()
            }),
            "thickness" => self.grid_values(|x, y| {
                20.0 + realization_offset / 10.0 + 10.0 * (x * std::f64::consts::PI).sin() * y
            }),
            _ => return Err(StoreError::NotFound(address.to_string())),
        };

        RegularSurface::new(self.ncol, self.nrow, 456000.0, 5926000.0, 50.0, 50.0, 0.0, values)
            .map_err(|error| StoreError::Format(error.to_string()))
    }

    fn build_slice(&self, address: &SeismicSliceAddress) -> Result<DepthSlice, StoreError> {
        if address.attribute != SEISMIC_ATTRIBUTE {
            return Err(StoreError::NotFound(address.to_string()));
        }
        let realization_phase = address.realization.0 as f64 * 0.35;
        let depth_phase = address.depth / 400.0;

        Ok(DepthSlice {
            depth: address.depth,
            ncol: self.ncol,
            nrow: self.nrow,
            xori: 456000.0,
            yori: 5926000.0,
            xinc: 50.0,
            yinc: 50.0,
            amplitudes: self.grid_values(|x, y| {
                ((x * 6.0 + realization_phase).sin() * (y * 5.0 + depth_phase).cos()) * 0.8
            }),
        })
    }

    fn pick_for(&self, wellbore_index: usize, name_index: usize) -> WellborePick {
        let depth = 1500.0 + name_index as f64 * 150.0 + wellbore_index as f64 * 12.0;
        WellborePick {
            wellbore: WELLBORES[wellbore_index].to_string(),
            pick_name: SURFACE_NAMES[name_index].to_string(),
            md: depth + 950.0,
            location: Vector3::new(
                456400.0 + wellbore_index as f64 * 220.0,
                5926300.0 + wellbore_index as f64 * 160.0,
                depth,
            ),
        }
    }
}

impl SurfaceStore for SyntheticBackend {
    fn surface_directory(
        &self,
        ensemble: &EnsembleIdent,
        _cancellation: CancellationToken,
    ) -> StoreFuture<Vec<SurfaceMeta>> {
        let known = self.ensemble_known(ensemble);
        async move {
            known?;
            Ok(SURFACE_NAMES
                .iter()
                .flat_map(|name| {
                    SURFACE_ATTRIBUTES
                        .iter()
                        .map(|attribute| SurfaceMeta {
                            name: name.to_string(),
                            attribute: attribute.to_string(),
                            time: TimeOrInterval::NoTime,
                        })
                })
                .collect())
        }
        .boxed()
    }

    fn regular_surface(&self, address: &SurfaceAddress, cancellation: CancellationToken) -> StoreFuture<RegularSurface> {
        let result = self
            .ensemble_known(&address.ensemble)
            .and_then(|()| self.build_surface(address));
        async move {
            if cancellation.is_cancelled() {
                return Err(StoreError::Cancelled);
            }
            result
        }
        .boxed()
    }
}

impl SeismicStore for SyntheticBackend {
    fn seismic_directory(
        &self,
        ensemble: &EnsembleIdent,
        _cancellation: CancellationToken,
    ) -> StoreFuture<Vec<SeismicCubeMeta>> {
        let known = self.ensemble_known(ensemble);
        async move {
            known?;
            Ok(vec![SeismicCubeMeta {
                attribute: SEISMIC_ATTRIBUTE.to_string(),
                time: TimeOrInterval::NoTime,
                depth_min: 1500.0,
                depth_max: 1900.0,
                depth_step: 100.0,
            }])
        }
        .boxed()
    }

    fn depth_slice(&self, address: &SeismicSliceAddress, cancellation: CancellationToken) -> StoreFuture<DepthSlice> {
        let result = self
            .ensemble_known(&address.ensemble)
            .and_then(|()| self.build_slice(address));
        async move {
            if cancellation.is_cancelled() {
                return Err(StoreError::Cancelled);
            }
            result
        }
        .boxed()
    }
}

impl WellboreStore for SyntheticBackend {
    fn wellbore_directory(&self, field: &str, _cancellation: CancellationToken) -> StoreFuture<Vec<WellboreHeader>> {
        let known = self.field_known(field);
        async move {
            known?;
            Ok(WELLBORES
                .iter()
                .enumerate()
                .map(|(index, name)| WellboreHeader {
                    name: name.to_string(),
                    total_depth: 2600.0 + index as f64 * 120.0,
                })
                .collect())
        }
        .boxed()
    }

    fn pick_identifiers(&self, field: &str, _cancellation: CancellationToken) -> StoreFuture<Vec<String>> {
        let known = self.field_known(field);
        async move {
            known?;
            Ok(SURFACE_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect())
        }
        .boxed()
    }

    fn picks_for_surface(
        &self,
        address: &WellborePicksAddress,
        _cancellation: CancellationToken,
    ) -> StoreFuture<Vec<WellborePick>> {
        let known = self.field_known(&address.field);
        let Some(name_index) = SURFACE_NAMES
            .iter()
            .position(|name| *name == address.pick_name)
        else {
            let key = address.to_string();
            return async move { Err(StoreError::NotFound(key)) }.boxed();
        };

        let picks = WELLBORES
            .iter()
            .enumerate()
            .filter(|(_, name)| address.wellbores.contains(&name.to_string()))
            .map(|(wellbore_index, _)| self.pick_for(wellbore_index, name_index))
            .collect::<Vec<_>>();

        async move {
            known?;
            Ok(picks)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_surfaces_are_deterministic_per_address() {
        // given
        let backend = SyntheticBackend::new();
        let address = SurfaceAddress {
            ensemble: backend.ensembles()[0].ident.clone(),
            realization: RealizationNumber(1),
            name: "TopVolantis".to_string(),
            attribute: "depth".to_string(),
            time: TimeOrInterval::NoTime,
        };

        // when
        let first = backend
            .regular_surface(&address, CancellationToken::new())
            .await
            .unwrap();
        let second = backend
            .regular_surface(&address, CancellationToken::new())
            .await
            .unwrap();

        // then
        assert_eq!(first, second);
        assert!(first.value_range().is_some());
    }

    #[tokio::test]
    async fn test_unknown_ensemble_is_not_found() {
        // given
        let backend = SyntheticBackend::new();

        // when
        let result = backend
            .surface_directory(&EnsembleIdent::new("unknown", "iter-0"), CancellationToken::new())
            .await;

        // then
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_picks_respect_requested_wellbores() {
        // given
        let backend = SyntheticBackend::new();

        // when
        let picks = backend
            .picks_for_surface(
                &WellborePicksAddress {
                    field: "DROGON".to_string(),
                    pick_name: "TopVolantis".to_string(),
                    wellbores: vec!["55/33-A-2".to_string()],
                },
                CancellationToken::new(),
            )
            .await
            .unwrap();

        // then
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].wellbore, "55/33-A-2");
    }
}
