//! Parsers for army rosters and deployment points given on the command line.

use std::str::FromStr;

use anyhow::{Context, Result, bail};

use battle_core::{Army, Point, TroopKind};

/// Parses `"barbarian=10,archer=5"`. Repeated kinds add up.
pub fn parse_army(spec: &str) -> Result<Army> {
    let mut army = Army::new();
    for entry in spec.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (kind, count) = entry
            .split_once('=')
            .with_context(|| format!("expected KIND=COUNT, got `{entry}`"))?;
        let kind = TroopKind::from_str(kind.trim())
            .with_context(|| format!("unknown troop kind `{}`", kind.trim()))?;
        let count: u32 = count
            .trim()
            .parse()
            .with_context(|| format!("invalid count for {kind}: `{}`", count.trim()))?;
        army.add(kind, count);
    }
    if army.is_exhausted() {
        bail!("army is empty");
    }
    Ok(army)
}

/// Parses `"x,y"` in grid units.
pub fn parse_point(spec: &str) -> Result<Point> {
    let (x, y) = spec
        .split_once(',')
        .with_context(|| format!("expected X,Y, got `{spec}`"))?;
    let x: f32 = x.trim().parse().with_context(|| format!("invalid x in `{spec}`"))?;
    let y: f32 = y.trim().parse().with_context(|| format!("invalid y in `{spec}`"))?;
    Ok(Point::new(x, y))
}

/// Deployment order: kinds in roster order, cycling through `points`.
pub fn deployment_plan(army: &Army, points: &[Point]) -> Vec<(TroopKind, Point)> {
    army.iter()
        .flat_map(|(kind, count)| std::iter::repeat_n(kind, count as usize))
        .zip(points.iter().copied().cycle())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rosters() {
        let army = parse_army("barbarian=10, Archer=5,barbarian=2").unwrap();
        assert_eq!(army.remaining(TroopKind::Barbarian), 12);
        assert_eq!(army.remaining(TroopKind::Archer), 5);
        assert_eq!(army.remaining(TroopKind::Giant), 0);

        assert!(parse_army("dragon=1").is_err());
        assert!(parse_army("giant").is_err());
        assert!(parse_army("giant=-1").is_err());
        assert!(parse_army("giant=0").is_err());
    }

    #[test]
    fn parses_points() {
        assert_eq!(parse_point("1.5, 20").unwrap(), Point::new(1.5, 20.0));
        assert!(parse_point("1.5").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn plan_cycles_deploy_points() {
        let army = Army::new()
            .with(TroopKind::Barbarian, 3)
            .with(TroopKind::Giant, 1);
        let points = [Point::new(1.0, 1.0), Point::new(2.0, 2.0)];

        let plan = deployment_plan(&army, &points);
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0], (TroopKind::Barbarian, points[0]));
        assert_eq!(plan[1], (TroopKind::Barbarian, points[1]));
        assert_eq!(plan[2], (TroopKind::Barbarian, points[0]));
        assert_eq!(plan[3], (TroopKind::Giant, points[1]));
    }
}
