use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

fn main() {
    println!("Probing camera access...\n");

    match nokhwa::query(nokhwa::utils::ApiBackend::Auto) {
        Ok(cameras) => {
            println!("Found {} camera(s):", cameras.len());
            for (i, camera) in cameras.iter().enumerate() {
                println!("  [{}] {}", i, camera.human_name());
            }
        }
        Err(e) => println!("Failed to query cameras: {}", e),
    }

    let index = CameraIndex::Index(0);
    let format = CameraFormat::new(Resolution::new(640, 480), FrameFormat::MJPEG, 30);
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Exact(format));

    match Camera::new(index, requested) {
        Ok(mut camera) => {
            println!("✓ Camera 0 opened");

            match camera.open_stream() {
                Ok(_) => {
                    println!("✓ Stream opened at 640x480 MJPEG");
                    match camera.frame() {
                        Ok(frame) => match frame.decode_image::<RgbFormat>() {
                            Ok(decoded) => println!(
                                "✓ Captured and decoded a {}x{} RGB frame",
                                decoded.width(),
                                decoded.height()
                            ),
                            Err(e) => println!("✗ Failed to decode frame: {}", e),
                        },
                        Err(e) => println!("✗ Failed to capture frame: {}", e),
                    }
                }
                Err(e) => println!("✗ Failed to open stream: {}", e),
            }
        }
        Err(e) => {
            println!("✗ Failed to open camera: {}", e);
            println!("\nPossible causes:");
            println!("1. Camera is being used by another app");
            println!("2. Camera permissions not granted");
            println!("3. No camera connected");
        }
    }
}
