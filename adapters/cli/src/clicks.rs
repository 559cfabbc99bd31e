use anyhow::{bail, Context, Result};
use glam::Vec3;
use tactics_grid_core::{ActorId, GridCoord};
use tactics_grid_system_selection::Click;

/// Parses a scripted click such as `actor:1`, `cell:2,3`, `at:1.5,0.5` or `empty`.
pub(crate) fn parse_click(value: &str) -> Result<Click> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("empty") {
        return Ok(Click::Empty);
    }

    let Some((kind, payload)) = trimmed.split_once(':') else {
        bail!("click `{trimmed}` must look like `actor:N`, `cell:X,Y[,Z]`, `at:X,Y[,Z]` or `empty`");
    };

    match kind.trim() {
        "actor" => {
            let id = payload
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid actor id `{payload}`"))?;
            Ok(Click::Actor(ActorId::new(id)))
        }
        "cell" => {
            let [x, y, z] = parse_components::<i32>(payload)?;
            Ok(Click::Ground(GridCoord::new(x, y, z)))
        }
        "at" => {
            let [x, y, z] = parse_components::<f32>(payload)?;
            Ok(Click::GroundAt(Vec3::new(x, y, z)))
        }
        other => bail!("unknown click kind `{other}`"),
    }
}

fn parse_components<T>(payload: &str) -> Result<[T; 3]>
where
    T: std::str::FromStr + Default + Copy,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let parts: Vec<&str> = payload.split(',').map(str::trim).collect();
    if !(2..=3).contains(&parts.len()) {
        bail!("expected two or three comma-separated components, got `{payload}`");
    }

    let mut components = [T::default(); 3];
    for (slot, part) in components.iter_mut().zip(&parts) {
        *slot = part
            .parse::<T>()
            .with_context(|| format!("invalid component `{part}` in `{payload}`"))?;
    }
    Ok(components)
}
