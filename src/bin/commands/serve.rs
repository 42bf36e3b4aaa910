use albumrip::chromium::ChromiumLauncher;
use albumrip::Pipeline;

pub async fn handle_serve(
    pipeline: Pipeline<ChromiumLauncher>,
    bind: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🌐 Serving /api/download on {bind}");
    albumrip::server::serve(pipeline, bind).await?;
    Ok(())
}
