use albumrip::chromium::ChromiumLauncher;
use albumrip::{Pipeline, PipelineEvent};
use tokio::sync::broadcast::error::RecvError;

pub async fn handle_run(
    mut pipeline: Pipeline<ChromiumLauncher>,
    links: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = pipeline.subscribe();

    let progress = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    println!("⚠️  Skipped {skipped} progress events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let report = pipeline.run(links).await;
    drop(pipeline);
    let _ = progress.await;

    println!();
    println!(
        "📊 {} of {} albums processed",
        report.albums.len(),
        report.links.len()
    );
    for album in &report.albums {
        println!("  {} ({} tracks)", album.album, album.track_count);
    }

    Ok(())
}

fn print_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::AlbumStarted {
            album, timestamp, ..
        } => {
            println!("[{}] 💿 {album}", timestamp.format("%H:%M:%S"));
        }
        PipelineEvent::ArtworkSaved { path, .. } => {
            println!("  🖼️  cover saved to {}", path.display());
        }
        PipelineEvent::ArtworkFailed { reason, .. } => {
            println!("  ⚠️  no cover: {reason}");
        }
        PipelineEvent::TracksDiscovered { count, .. } => {
            println!("  🔍 {count} tracks");
        }
        PipelineEvent::TrackConverted { index, track, .. } => {
            println!("  ✅ {index}: {track}");
        }
        PipelineEvent::TrackFailed {
            index,
            track,
            reason,
            ..
        } => {
            println!("  ❌ {index}: {track} ({reason})");
        }
        PipelineEvent::AlbumFinished {
            converted, failed, ..
        } => {
            println!("  🏁 {converted} converted, {failed} failed");
        }
        PipelineEvent::AlbumFailed { link, reason, .. } => {
            println!("  ❌ {link}: {reason}");
        }
    }
}
