use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn get_input() -> klei_ktex::RasterBuffer {
    let (width, height) = (256u32, 256u32);
    let pixels = (0..height)
        .flat_map(|y| (0..width).flat_map(move |x| [x as u8, y as u8, (x ^ y) as u8, y as u8]))
        .collect();
    klei_ktex::RasterBuffer::new(width, height, pixels).unwrap()
}

pub mod pixel {
    use divan::Bencher;
    use klei_ktex::{pixel, PixelFormat, Quality};

    use crate::get_input;

    #[divan::bench(args = [PixelFormat::Dxt1, PixelFormat::Dxt5, PixelFormat::Rgba])]
    fn encode(bencher: Bencher, format: PixelFormat) {
        bencher
            .with_inputs(get_input)
            .bench_refs(|raster| divan::black_box(pixel::encode_with(format, raster, Quality::Fast)));
    }

    #[divan::bench(args = [PixelFormat::Dxt1, PixelFormat::Dxt5, PixelFormat::Rgba])]
    fn decode(bencher: Bencher, format: PixelFormat) {
        let data = pixel::encode_with(format, &get_input(), Quality::Fast);
        bencher.bench_local(|| divan::black_box(pixel::decode(format, &data, 256, 256).unwrap()));
    }
}

pub mod mipmap {
    use divan::Bencher;
    use klei_ktex::mipmap;

    use crate::get_input;

    #[divan::bench]
    fn generate_chain(bencher: Bencher) {
        bencher
            .with_inputs(get_input)
            .bench_values(|raster| divan::black_box(mipmap::generate_chain(raster, None)));
    }
}

pub mod read {
    use divan::Bencher;
    use klei_ktex::{mipmap, pixel, write::KtexWriterOptions, KtexWriter, TextureContainer};

    use crate::get_input;

    fn get_texture() -> Vec<u8> {
        let options = KtexWriterOptions::default();
        let mut ktex = KtexWriter::new(Vec::new(), options);
        for level in mipmap::generate_chain(get_input(), None) {
            let data = pixel::encode(options.pixel_format, &level);
            ktex.push_level(level.width(), level.height(), &data).unwrap();
        }
        ktex.finish().unwrap()
    }

    #[divan::bench]
    fn open(bencher: Bencher) {
        bencher.with_inputs(get_texture).bench_refs(|data| {
            divan::black_box(TextureContainer::from_bytes(data).unwrap());
        });
    }

    #[divan::bench(sample_count = 10)]
    fn to_png(bencher: Bencher) {
        let texture = TextureContainer::from_bytes(&get_texture()).unwrap();
        bencher.bench_local(move || {
            let base = &texture.mips[0];
            let raster =
                pixel::decode(texture.pixel_format, &base.data, base.width, base.height).unwrap();
            divan::black_box(raster.to_png().unwrap());
        });
    }
}
