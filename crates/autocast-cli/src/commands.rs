//! The small subcommands: `windows`, `profiles`, `save` and `pattern`.

use anyhow::{bail, Result};
use autocast_core::{
    delete_profile, list_profiles, load_last_used, save_profile, save_profile_file, Point,
    Profile, PatternGenerator, Region,
};
use autocast_platform::{get_foreground_window, list_windows, set_dpi_aware, WindowInfo};
use tracing::info;

use crate::cli::{PatternArgs, ProfilesArgs, SaveArgs, WindowsArgs};

pub fn windows(args: &WindowsArgs) -> Result<()> {
    set_dpi_aware();
    let candidates = if args.foreground {
        get_foreground_window().into_iter().collect()
    } else {
        list_windows()
    };
    let windows = filter_windows(candidates, args.filter.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&windows)?);
        return Ok(());
    }
    if windows.is_empty() {
        eprintln!("no windows found");
    }
    for w in &windows {
        println!(
            "{:>10}  {:>6}  {:>5},{:<5} {:>4}x{:<4}  {:<20}  {}",
            w.handle.to_string(),
            w.pid,
            w.rect.x,
            w.rect.y,
            w.rect.width,
            w.rect.height,
            w.process_name,
            w.title
        );
    }
    Ok(())
}

/// Keep windows whose title or process contains `filter` (case-insensitive).
fn filter_windows(windows: Vec<WindowInfo>, filter: Option<&str>) -> Vec<WindowInfo> {
    let Some(filter) = filter else {
        return windows;
    };
    windows
        .into_iter()
        .filter(|w| w.matches(Some(filter), None) || w.matches(None, Some(filter)))
        .collect()
}

pub fn profiles(args: &ProfilesArgs) -> Result<()> {
    if let Some(name) = &args.delete {
        delete_profile(name)?;
        println!("deleted {name}");
        return Ok(());
    }

    let last = load_last_used();
    let names = list_profiles()?;
    if names.is_empty() {
        eprintln!("no saved profiles");
    }
    for name in names {
        let marker = if last.as_deref() == Some(name.as_str()) { "*" } else { " " };
        println!("{marker} {name}");
    }
    Ok(())
}

pub fn save(args: &SaveArgs) -> Result<()> {
    let mut profile = Profile {
        name: args.name.clone(),
        ..Profile::default()
    };
    args.target.apply(&mut profile);
    args.session.apply(&mut profile);
    if profile.points.is_empty() {
        bail!("a profile needs at least one --point X,Y");
    }

    let path = match &args.file {
        Some(path) => {
            save_profile_file(&profile, path)?;
            path.clone()
        }
        None => save_profile(&profile)?,
    };
    info!(name = %profile.name, points = profile.points.len(), "profile saved");
    println!("{}", path.display());
    Ok(())
}

pub fn pattern(args: &PatternArgs) -> Result<()> {
    let points = generate(args)?;
    if args.json {
        println!("{}", serde_json::to_string(&points)?);
    } else {
        for p in points {
            println!("{},{}", p.x, p.y);
        }
    }
    Ok(())
}

fn generate(args: &PatternArgs) -> Result<Vec<Point>> {
    let generator = match (&args.polygon, args.rect) {
        (Some(polygon), _) => PatternGenerator::polygon(polygon.0.clone(), args.step, args.pattern)?,
        (None, Some(rect)) => PatternGenerator::new(Region::rect(rect)?, args.step, args.pattern)?,
        (None, None) => bail!("pass --rect or --polygon"),
    };
    let generator = match args.seed {
        Some(seed) => generator.with_seed(seed),
        None => generator,
    };
    Ok(generator.take(args.count).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use autocast_core::{Rect, WindowHandle};
    use clap::Parser;

    fn window(title: &str, process: &str) -> WindowInfo {
        WindowInfo {
            handle: WindowHandle(1),
            title: title.into(),
            process_name: process.into(),
            pid: 1,
            rect: Rect::new(0, 0, 640, 480),
            visible: true,
        }
    }

    #[test]
    fn test_filter_windows_by_title_or_process() {
        let all = vec![
            window("Untitled - Notepad", "notepad.exe"),
            window("Guild Wars", "gw.exe"),
            window("Inbox", "outlook.exe"),
        ];
        let titles = |ws: Vec<WindowInfo>| ws.into_iter().map(|w| w.title).collect::<Vec<_>>();

        assert_eq!(titles(filter_windows(all.clone(), None)).len(), 3);
        assert_eq!(titles(filter_windows(all.clone(), Some("NOTE"))), vec!["Untitled - Notepad"]);
        assert_eq!(titles(filter_windows(all.clone(), Some("gw.exe"))), vec!["Guild Wars"]);
        assert!(filter_windows(all, Some("steam")).is_empty());
    }

    fn pattern_args(argv: &[&str]) -> PatternArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Pattern(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_generate_grid_rect() {
        let args = pattern_args(&[
            "autocast", "pattern", "--rect", "100,100,50,50", "--step", "20", "-n", "4",
        ]);
        let points = generate(&args).unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(100, 100),
                Point::new(120, 100),
                Point::new(140, 100),
                Point::new(149, 120),
            ]
        );
    }

    #[test]
    fn test_generate_seeded_polygon_is_reproducible() {
        let argv = [
            "autocast", "pattern", "--polygon", "0,0;200,0;100,150", "--pattern", "random",
            "--seed", "7", "-n", "10",
        ];
        let a = generate(&pattern_args(&argv)).unwrap();
        let b = generate(&pattern_args(&argv)).unwrap();
        assert_eq!(a.len(), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_rejects_bad_step() {
        let args = pattern_args(&["autocast", "pattern", "--rect", "0,0,10,10", "--step", "0"]);
        assert!(generate(&args).is_err());
    }
}
