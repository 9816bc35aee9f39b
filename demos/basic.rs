use windowed_list::memory::MemoryHost;
use windowed_list::{Align, Config, WindowedScroller};

fn main() {
    let mut list = WindowedScroller::new(
        MemoryHost::new(600.0),
        1_000_000,
        Config::default(),
        |i| format!("row #{i}"),
    );
    let root = list.host_mut().create_root();
    list.mount(root);

    println!("total_height={}", list.total_height());
    println!("visible_range={:?}", list.visible_range());

    list.on_scroll(|p| println!("  scrolled to {p}"));

    list.host_mut().advance(0.02);
    list.handle_scroll(123_456.0);
    println!("after scroll: {:?}", list.statistics());

    list.scroll_to_index_aligned(999_999, Align::End);
    println!(
        "after scroll_to_index: position={} range={:?}",
        list.metrics().position(),
        list.visible_range()
    );

    list.unmount();
    println!("nodes left after unmount: {}", list.host().node_count());
}
