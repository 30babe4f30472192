//! Integration tests for `tessera`

mod containers;
mod levels;
mod residency;

use tessera::prelude::*;

/// Builds the container shared by the integration tests.
///
/// Two sprites, three palettes, one background using two of them, two object
/// definitions and two levels.
pub(crate) fn sample_container() -> ContainerBuilder {
	let mut builder = ContainerBuilder::new();
	builder.add_graphics(32, 32, 0, 0, vec![0x3C; 512]).unwrap();
	builder.add_graphics(8, 16, 2, 1, vec![0x5A; 64]).unwrap();
	for shade in 0..3u8 {
		builder.add_palette(vec![shade; 32]).unwrap();
	}

	let size = BackgroundSize::from_class(1).unwrap();
	let refs = (0..size.cells())
		.map(|cell| {
			let palette = if cell % 3 == 0 {
				None
			} else {
				Some(2)
			};
			TileRef::new((cell % 6) as u16, palette, cell % 2 == 1, false)
		})
		.collect();
	builder.add_background(size, Some(1), refs).unwrap();

	let walk = Animation {
		frames: vec![AnimationFrame {
			graphics_id: 1,
			palette_id: 0,
			duration: 4,
		}],
	};
	builder.add_object(10, vec![walk.clone(), walk]).unwrap();
	builder.add_object(200, Vec::new()).unwrap();

	let mut first = Level::new();
	first.layers[0] = Some(LayerRef {
		background_id: 0,
		distance: 0,
	});
	first.heroes.push(Placement {
		object_id: 0,
		x: 16,
		y: 200,
		gravity: Gravity {
			horizontal: Fx12(0),
			vertical: Fx12::from_f32(1.5),
		},
	});
	first.objects.push(Placement {
		object_id: 1,
		x: 300,
		y: 40,
		gravity: Gravity::default(),
	});
	builder.add_level(first);

	let mut second = Level::new();
	second.layers[2] = Some(LayerRef {
		background_id: 0,
		distance: 3,
	});
	builder.add_level(second);

	builder
}
