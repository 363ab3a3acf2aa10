use crate::model::*;

// ── Column Assignment ─────────────────────────────────────────────

/// Horizontal lane of one block within its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub block_id: BlockId,
    /// Zero-based lane, left to right.
    pub col: u32,
    /// Lanes shared by the block's whole overlap cluster.
    pub total_cols: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayLayout {
    /// Block ids per lane, in placement order (tail = last placed).
    pub columns: Vec<Vec<BlockId>>,
    /// One entry per block, in `(start, id)` order.
    pub placements: Vec<Placement>,
}

impl DayLayout {
    pub fn placement(&self, id: BlockId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.block_id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Assign lanes to one day's blocks.
///
/// Blocks are walked in `(start, id)` order and dropped into the first lane
/// whose tail ends at or before their start, opening a new lane otherwise.
/// A cluster closes when a block starts at or after the furthest end seen in
/// it; every member of the cluster gets the cluster's lane count, so a late
/// block that widens a 3-way overlap also widens the earlier ones.
///
/// Equal starts go to the lower id first, i.e. the older block sits left.
pub fn layout_day<'a>(blocks: impl IntoIterator<Item = &'a ScheduleBlock>) -> DayLayout {
    let mut sorted: Vec<&ScheduleBlock> = blocks.into_iter().collect();
    sorted.sort_by_key(|b| (b.start, b.id));

    let mut columns: Vec<Vec<BlockId>> = Vec::new();
    let mut column_ends: Vec<Slot> = Vec::new();
    let mut placements: Vec<Placement> = Vec::with_capacity(sorted.len());

    let mut cluster_first = 0usize;
    let mut cluster_end: Slot = 0;
    let mut cluster_cols: u32 = 0;

    for block in sorted {
        if placements.len() > cluster_first && block.start >= cluster_end {
            close_cluster(&mut placements[cluster_first..], cluster_cols);
            cluster_first = placements.len();
            cluster_cols = 0;
        }

        let col = match column_ends.iter().position(|&end| end <= block.start) {
            Some(c) => {
                column_ends[c] = block.end;
                columns[c].push(block.id);
                c
            }
            None => {
                column_ends.push(block.end);
                columns.push(vec![block.id]);
                columns.len() - 1
            }
        };
        let col = col as u32;

        cluster_end = if placements.len() == cluster_first {
            block.end
        } else {
            cluster_end.max(block.end)
        };
        cluster_cols = cluster_cols.max(col + 1);
        placements.push(Placement { block_id: block.id, col, total_cols: 0 });
    }
    close_cluster(&mut placements[cluster_first..], cluster_cols);

    DayLayout { columns, placements }
}

fn close_cluster(members: &mut [Placement], total_cols: u32) {
    for p in members {
        p.total_cols = total_cols;
    }
}

/// Lane assignment for all seven days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekLayout {
    days: [DayLayout; 7],
}

impl WeekLayout {
    pub fn day(&self, day: Day) -> &DayLayout {
        &self.days[day.index()]
    }

    pub fn placement(&self, day: Day, id: BlockId) -> Option<&Placement> {
        self.day(day).placement(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &DayLayout)> {
        Day::ALL.into_iter().zip(self.days.iter())
    }
}

/// Group the schedule by day and lay each day out independently.
pub fn layout_week(schedule: &Schedule) -> WeekLayout {
    let mut by_day: [Vec<&ScheduleBlock>; 7] = Default::default();
    for block in schedule.values() {
        by_day[block.day.index()].push(block);
    }
    WeekLayout {
        days: by_day.map(layout_day),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn block(id: i64, day: Day, start: Slot, end: Slot) -> ScheduleBlock {
        ScheduleBlock {
            id: BlockId(id),
            day,
            start,
            end,
            title: format!("b{id}"),
            description: None,
            category_id: None,
        }
    }

    fn cols(layout: &DayLayout, id: i64) -> (u32, u32) {
        let p = layout.placement(BlockId(id)).unwrap();
        (p.col, p.total_cols)
    }

    /// Maximum number of blocks live at one instant (sweep line).
    fn peak_overlap(blocks: &[ScheduleBlock]) -> u32 {
        let mut events: Vec<(Slot, i32)> = Vec::with_capacity(blocks.len() * 2);
        for b in blocks {
            events.push((b.start, 1));
            events.push((b.end, -1));
        }
        // Ends before starts at the same slot: half-open.
        events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        let mut live = 0i32;
        let mut peak = 0i32;
        for (_, delta) in events {
            live += delta;
            peak = peak.max(live);
        }
        peak as u32
    }

    /// Up to 30 blocks on one day: starts in `0..80`, lengths `1..=12`.
    fn day_strategy() -> impl Strategy<Value = Vec<ScheduleBlock>> {
        proptest::collection::vec((0..80u32, 1..13u32), 0..30).prop_map(|spans| {
            spans
                .into_iter()
                .enumerate()
                .map(|(i, (start, len))| block(i as i64 + 1, Day::Wed, start, (start + len).min(84)))
                .collect()
        })
    }

    #[test]
    fn empty_day() {
        let layout = layout_day(std::iter::empty());
        assert!(layout.is_empty());
        assert!(layout.columns.is_empty());
    }

    #[test]
    fn single_block_full_width() {
        let b = block(1, Day::Mon, 4, 9);
        let layout = layout_day([&b]);
        assert_eq!(cols(&layout, 1), (0, 1));
    }

    #[test]
    fn two_overlapping() {
        let a = block(1, Day::Mon, 0, 4);
        let b = block(2, Day::Mon, 2, 6);
        let layout = layout_day([&b, &a]);
        assert_eq!(cols(&layout, 1), (0, 2));
        assert_eq!(cols(&layout, 2), (1, 2));
    }

    #[test]
    fn three_way_overlap() {
        let blocks = [
            block(1, Day::Mon, 0, 10),
            block(2, Day::Mon, 2, 5),
            block(3, Day::Mon, 3, 8),
        ];
        let layout = layout_day(&blocks);
        assert_eq!(cols(&layout, 1), (0, 3));
        assert_eq!(cols(&layout, 2), (1, 3));
        assert_eq!(cols(&layout, 3), (2, 3));
    }

    #[test]
    fn late_block_widens_whole_cluster() {
        // 3 needs a third lane at slot 2; 4 reuses lane 1 once 2 has
        // ended, but still renders at a third of the width.
        let blocks = [
            block(1, Day::Thu, 0, 10),
            block(2, Day::Thu, 1, 3),
            block(3, Day::Thu, 2, 6),
            block(4, Day::Thu, 4, 5),
        ];
        let layout = layout_day(&blocks);
        for id in 1..=4 {
            assert_eq!(cols(&layout, id).1, 3, "block {id}");
        }
        assert_eq!(cols(&layout, 4).0, 1); // reuses lane of block 2
    }

    #[test]
    fn chained_cluster_shares_width() {
        // 1 overlaps 2, 2 overlaps 3, 1 and 3 do not touch.
        let blocks = [
            block(1, Day::Fri, 0, 4),
            block(2, Day::Fri, 2, 6),
            block(3, Day::Fri, 5, 8),
        ];
        let layout = layout_day(&blocks);
        assert_eq!(cols(&layout, 1), (0, 2));
        assert_eq!(cols(&layout, 2), (1, 2));
        assert_eq!(cols(&layout, 3), (0, 2));
    }

    #[test]
    fn separate_clusters_sized_independently() {
        let blocks = [
            block(1, Day::Sat, 0, 4),
            block(2, Day::Sat, 1, 3),
            block(3, Day::Sat, 10, 12),
        ];
        let layout = layout_day(&blocks);
        assert_eq!(cols(&layout, 1), (0, 2));
        assert_eq!(cols(&layout, 2), (1, 2));
        assert_eq!(cols(&layout, 3), (0, 1));
    }

    #[test]
    fn adjacent_blocks_share_lane() {
        let blocks = [block(1, Day::Sun, 0, 4), block(2, Day::Sun, 4, 8)];
        let layout = layout_day(&blocks);
        assert_eq!(cols(&layout, 1), (0, 1));
        assert_eq!(cols(&layout, 2), (0, 1));
        assert_eq!(layout.columns, vec![vec![BlockId(1), BlockId(2)]]);
    }

    #[test]
    fn equal_starts_ordered_by_id() {
        let blocks = [
            block(30, Day::Tue, 5, 9),
            block(10, Day::Tue, 5, 7),
            block(20, Day::Tue, 5, 6),
        ];
        let layout = layout_day(&blocks);
        assert_eq!(cols(&layout, 10), (0, 3));
        assert_eq!(cols(&layout, 20), (1, 3));
        assert_eq!(cols(&layout, 30), (2, 3));
    }

    proptest! {
        #[test]
        fn columns_partition_the_day(blocks in day_strategy()) {
            let layout = layout_day(&blocks);
            let mut seen: Vec<BlockId> = layout.columns.iter().flatten().copied().collect();
            seen.sort();
            let mut expected: Vec<BlockId> = blocks.iter().map(|b| b.id).collect();
            expected.sort();
            prop_assert_eq!(seen, expected);
            prop_assert_eq!(layout.placements.len(), blocks.len());
        }

        #[test]
        fn lanes_never_overlap_and_fit(blocks in day_strategy()) {
            let layout = layout_day(&blocks);
            for p in &layout.placements {
                prop_assert!(p.col < p.total_cols, "{:?}", p);
            }
            for lane in &layout.columns {
                let spans: Vec<SlotSpan> = lane
                    .iter()
                    .filter_map(|id| blocks.iter().find(|b| b.id == *id))
                    .map(ScheduleBlock::span)
                    .collect();
                prop_assert_eq!(spans.len(), lane.len());
                for pair in spans.windows(2) {
                    prop_assert!(pair[0].end <= pair[1].start);
                }
            }
        }

        #[test]
        fn cluster_width_covers_peak_overlap(blocks in day_strategy()) {
            let layout = layout_day(&blocks);
            for b in &blocks {
                let overlapping: Vec<ScheduleBlock> = blocks
                    .iter()
                    .filter(|o| o.span().overlaps(&b.span()))
                    .cloned()
                    .collect();
                let cols = layout.placement(b.id).map(|p| p.total_cols);
                prop_assert!(cols.is_some_and(|c| c >= peak_overlap(&overlapping)));
            }
            let widest = layout.placements.iter().map(|p| p.total_cols).max().unwrap_or(0);
            prop_assert_eq!(widest, peak_overlap(&blocks));
        }

        #[test]
        fn layout_is_idempotent(blocks in day_strategy()) {
            prop_assert_eq!(layout_day(&blocks), layout_day(&blocks));
            let reversed: Vec<&ScheduleBlock> = blocks.iter().rev().collect();
            prop_assert_eq!(layout_day(reversed), layout_day(&blocks));
        }
    }

    #[test]
    fn week_layout_keeps_days_apart() {
        let mut schedule = Schedule::new();
        for b in [
            block(1, Day::Mon, 0, 4),
            block(2, Day::Mon, 2, 6),
            block(3, Day::Tue, 0, 4),
        ] {
            schedule.insert(b.id, b);
        }
        let week = layout_week(&schedule);
        assert_eq!(week.placement(Day::Mon, BlockId(2)).unwrap().total_cols, 2);
        assert_eq!(week.placement(Day::Tue, BlockId(3)).unwrap().total_cols, 1);
        assert!(week.day(Day::Sun).is_empty());
        assert_eq!(week.iter().count(), 7);
    }
}
