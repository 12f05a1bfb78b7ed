//! Built-in content: chapter table, quiz names, seed problems and the demo solution.
//!
//! This guarantees the app is useful without any external config or AI key.

use crate::domain::{
  Chapter, Drawing, DrawingKind, Grade, MathStep, Problem, Quiz, Semester, Solution, Technique,
  WhiteboardStep,
};

fn technique(id: &str, title: &str, method_name: &str) -> Technique {
  Technique { id: id.into(), title: title.into(), method_name: method_name.into() }
}

/// Grade 7 (first semester) chapter/technique table.
pub fn grade7_chapters() -> Vec<Chapter> {
  vec![
    Chapter {
      id: "z1".into(),
      title: "专题一：有理数".into(),
      techniques: vec![
        technique("t1", "考法1：用分类讨论思想解数轴上的整点与动点问题", "分类讨论思想"),
        technique("t2", "考法2：用归纳猜想解数轴上的规律探究问题", "归纳猜想"),
        technique("t3", "考点2：比较有理数大小常用的方法", "比较法"),
        technique("t4", "考法1：绝对值的性质及其运用", "绝对值性质"),
        technique("t5", "考法2：几何意义的运用", "几何意义"),
        technique("t6", "考点4：有理数的新定义问题", "新定义"),
        technique("t7", "考点5：有理数的实际应用", "实际应用"),
      ],
    },
    Chapter {
      id: "z2".into(),
      title: "专题二：有理数的运算".into(),
      techniques: vec![
        technique("t8", "考法1：拼凑法", "混合运算"),
        technique("t9", "考法2：裂项法", "混合运算"),
        technique("t10", "考法3：倒数法和运算律", "混合运算"),
        technique("t11", "考法4：混合运算", "混合运算"),
        technique("t12", "考法1：数轴上的折叠问题", "折叠模型"),
        technique("t13", "考法2：用分类讨论思想解数轴与有理数运算相关的动点问题", "分类讨论"),
        technique("t14", "考点3：有理数的运算与绝对值的综合运用", "分类讨论"),
        technique("t15", "考点4：与有理数运算相关的新定义问题", "化归思想"),
      ],
    },
    Chapter {
      id: "z3".into(),
      title: "专题三：代数式".into(),
      techniques: vec![
        technique("t16", "考点1：用字母表示数", "代数基础"),
        technique("t17", "考法1：直接求代数式的值", "代数式求值"),
        technique("t18", "考法2：整体思想求代数式的值", "整体思想"),
        technique("t19", "考点3：用归纳猜想解代数式中的规律探究问题", "归纳猜想"),
        technique("t20", "考点4：代数式的新定义问题", "新定义"),
      ],
    },
    Chapter {
      id: "z4".into(),
      title: "专题四：整式的加减".into(),
      techniques: vec![
        technique("t21", "考点1：利用整体思想化简求值", "整体思想"),
        technique("t22", "考法1：利用数轴化简绝对值", "数形结合"),
        technique("t23", "考法2：利用分类讨论思想化简绝对值", "分类讨论"),
        technique("t24", "考点3：用转化思想解整式的加减中的新定义问题", "转化思想"),
      ],
    },
    Chapter {
      id: "z5".into(),
      title: "专题五：一元一次方程".into(),
      techniques: vec![
        technique("t25", "【考点1】考法1：用整体思想解一元一次方程", "整体思想"),
        technique("t26", "【考点1】考法2：用特殊化与一般化思想解一元一次方程（裂项相消法）", "裂项相消"),
        technique("t27", "【考点1】考法3：用分类讨论思想解含绝对值的一元一次方程", "分类讨论"),
        technique("t38", "【考点2】考法1：两个一元一次方程解的关系", "参数问题"),
        technique("t39", "【考点2】考法2：一元一次方程的错解问题", "错解问题"),
        technique("t40", "【考点2】考法3：整数解问题", "整数解"),
        technique("t41", "【考点3】用转化思想解新定义问题", "转化思想"),
        technique("t42", "【考点4】考法1：调配与配套问题", "调配配套"),
        technique("t43", "【考点4】考法2：工程问题", "工程问题"),
        technique("t44", "【考点4】考法3：行程问题", "行程问题"),
        technique("t28", "【考点4】考法4：销售利润问题", "销售利润"),
        technique("t29", "【考点4】考法5：分段计费问题", "分段计费"),
        technique("t30", "【考点4】考法6：方案选择问题", "方案选择"),
        technique("t31", "【考点4】考法7：古代数学问题", "古代数学"),
      ],
    },
    Chapter {
      id: "z6".into(),
      title: "专题六：几何图形初步".into(),
      techniques: vec![
        technique("t32", "【考点1】考法1：整体思想", "整体思想"),
        technique("t33", "【考点1】考法2：方程思想", "方程思想"),
        technique("t34", "【考点1】考法3：分类讨论思想", "分类讨论"),
        technique("t35", "【考点1】考法4：数形结合思想", "数形结合"),
        technique("t36", "【考点2】考法1：整体思想", "整体思想"),
        technique("t37", "【考点2】考法2：方程思想", "方程思想"),
      ],
    },
  ]
}

/// Quiz collections, in display order.
pub const QUIZZES: [Quiz; 7] = [
  Quiz { id: "z1", name: "专题集训一：有理数" },
  Quiz { id: "z2", name: "专题集训二：有理数的运算" },
  Quiz { id: "z3", name: "专题集训三：代数式" },
  Quiz { id: "z4", name: "专题集训四：整式的加减" },
  Quiz { id: "z5", name: "专题集训五：一元一次方程" },
  Quiz { id: "z6", name: "专题集训六：几何图形初步" },
  Quiz { id: "final", name: "七上期末冲刺练" },
];

fn step(title: &str, content: &str, formula: Option<&str>) -> MathStep {
  MathStep { title: title.into(), content: content.into(), formula: formula.map(Into::into) }
}

#[allow(clippy::too_many_arguments)]
fn problem(
  id: &str,
  category: &str,
  title: &str,
  difficulty: u8,
  tags: &[&str],
  content: &str,
  steps: Vec<MathStep>,
  method_name: Option<&str>,
) -> Problem {
  Problem {
    id: id.into(),
    grade: Grade::Seven,
    semester: Semester::Up,
    category: category.into(),
    title: title.into(),
    difficulty,
    tags: tags.iter().map(|t| t.to_string()).collect(),
    content: content.into(),
    steps,
    method_name: method_name.map(Into::into),
    images: None,
    page_number: None,
  }
}

/// Seed problem bank, in catalog order.
pub fn seed_problems() -> Vec<Problem> {
  vec![
    // ---- t1: 数轴动点 ----
    problem(
      "t1-example", "有理数", "例题：数轴上的整点问题", 3, &["数轴", "分类讨论"],
      "在数轴上，把表示 $-1$ 的点 $A$ 向右移动 $5$ 个单位长度得到点 $B$，求线段 $AB$ 上（含端点）共有多少个整点？",
      vec![
        step("第一步：确定点 B", "向右移动用加法：$-1 + 5 = 4$，所以点 $B$ 表示 $4$。", Some("B = -1 + 5 = 4")),
        step("第二步：数整点", "从 $-1$ 到 $4$ 的整数有 $-1, 0, 1, 2, 3, 4$。", None),
        step("第三步：得出结论", "共有 $4 - (-1) + 1 = 6$ 个整点。", Some("4 - (-1) + 1 = 6")),
      ],
      Some("分类讨论思想"),
    ),
    problem(
      "t1-train-1", "有理数", "针对训练1：动点的距离", 2, &["数轴", "动点"],
      "点 $P$ 从原点出发，先向左移动 $3$ 个单位，再向右移动 $7$ 个单位，此时点 $P$ 表示的数是多少？",
      vec![
        step("列式", "向左为负，向右为正：$0 - 3 + 7$。", None),
        step("计算", "$0 - 3 + 7 = 4$，所以点 $P$ 表示 $4$。", Some("0 - 3 + 7 = 4")),
      ],
      Some("分类讨论思想"),
    ),
    problem(
      "t1-train-2", "有理数", "针对训练2：两点间的距离", 3, &["数轴", "距离"],
      "数轴上点 $A$ 表示 $-2$，点 $B$ 与点 $A$ 的距离为 $3$，求点 $B$ 表示的数。",
      vec![
        step("分类：B 在 A 右侧", "$-2 + 3 = 1$。", None),
        step("分类：B 在 A 左侧", "$-2 - 3 = -5$。", None),
        step("结论", "点 $B$ 表示 $1$ 或 $-5$。", None),
      ],
      Some("分类讨论思想"),
    ),
    problem(
      "t1-train-3", "有理数", "针对训练3：整点个数", 3, &["数轴", "整点"],
      "数轴上一条长为 $2024$ 个单位长度的线段，最多能覆盖多少个整点？",
      vec![
        step("端点是整点", "若两端点都是整点，覆盖 $2024 + 1 = 2025$ 个整点。", None),
        step("端点不是整点", "若端点不是整点，覆盖 $2024$ 个整点。", None),
        step("结论", "最多覆盖 $2025$ 个整点。", None),
      ],
      Some("分类讨论思想"),
    ),
    // ---- t2: 规律探究 ----
    problem(
      "t2-example", "有理数", "例题：翻滚的三角形", 4, &["数轴", "规律"],
      "边长为 $1$ 的等边三角形在数轴上从原点开始向右翻滚，顶点 $A$ 最初在原点。翻滚 $2024$ 次后，点 $A$ 是否落在数轴上？",
      vec![
        step("找周期", "每翻滚 $3$ 次，点 $A$ 回到数轴上一次。", None),
        step("求余数", "$2024 \\div 3 = 674 \\cdots 2$。", Some("2024 = 3 \\times 674 + 2")),
        step("结论", "余数不为 $0$，所以点 $A$ 不在数轴上。", None),
      ],
      Some("归纳猜想"),
    ),
    problem(
      "t2-train-1", "有理数", "针对训练1：圆周上的数", 3, &["规律"],
      "把 $1, 2, 3, \\ldots$ 依次写在周长为 $4$ 的圆周上，数 $2025$ 与哪个数重合？",
      vec![
        step("找周期", "每 $4$ 个数重合一次。", None),
        step("求余数", "$2025 \\div 4 = 506 \\cdots 1$，与 $1$ 重合。", None),
      ],
      Some("归纳猜想"),
    ),
    // ---- t4: 绝对值 ----
    problem(
      "t4-example", "有理数", "例题：绝对值的非负性", 3, &["绝对值"],
      "已知 $|a - 2| + |b + 3| = 0$，求 $a + b$ 的值。",
      vec![
        step("非负性", "绝对值非负，两个非负数之和为 $0$，则每个都为 $0$。", None),
        step("求 a、b", "$a = 2$，$b = -3$。", None),
        step("求和", "$a + b = -1$。", Some("a + b = 2 + (-3) = -1")),
      ],
      Some("绝对值性质"),
    ),
    problem(
      "t4-train-1", "有理数", "针对训练1：化简绝对值", 2, &["绝对值"],
      "若 $a < 0$，化简 $|a| + a$。",
      vec![step("去绝对值", "$a < 0$ 时 $|a| = -a$，所以 $|a| + a = 0$。", None)],
      Some("绝对值性质"),
    ),
    // ---- t10: 倒数法 ----
    problem(
      "t10-example", "有理数的运算", "例题：倒数法", 4, &["运算", "倒数"],
      "计算 $\\frac{1}{30} \\div \\left(\\frac{2}{3} - \\frac{1}{10} + \\frac{1}{6} - \\frac{2}{5}\\right)$。",
      vec![
        step("先求倒数", "原式的倒数为 $\\left(\\frac{2}{3} - \\frac{1}{10} + \\frac{1}{6} - \\frac{2}{5}\\right) \\times 30 = 20 - 3 + 5 - 12 = 10$。", None),
        step("还原", "所以原式 $= \\frac{1}{10}$。", None),
      ],
      Some("混合运算"),
    ),
    // ---- t12: 折叠 ----
    problem(
      "t12-example", "有理数的运算", "例题：数轴折叠", 3, &["数轴", "折叠"],
      "将数轴折叠，使表示 $-1$ 的点与表示 $3$ 的点重合，则表示 $5$ 的点与表示哪个数的点重合？",
      vec![
        step("找折痕", "折痕对应的数为 $\\frac{-1 + 3}{2} = 1$。", Some("\\frac{-1+3}{2} = 1")),
        step("求对称点", "$2 \\times 1 - 5 = -3$。", None),
      ],
      Some("折叠模型"),
    ),
    problem(
      "t12-train-1", "有理数的运算", "针对训练1：折叠求距离", 3, &["数轴", "折叠"],
      "折叠数轴使 $-2$ 与 $4$ 重合，若 $A$、$B$ 两点重合且 $AB = 8$（$A$ 在左），求 $A$、$B$ 表示的数。",
      vec![
        step("找折痕", "折痕在 $1$。", None),
        step("对称分布", "$A = 1 - 4 = -3$，$B = 1 + 4 = 5$。", None),
      ],
      Some("折叠模型"),
    ),
    // ---- t19: 规律 ----
    problem(
      "t19-example", "代数式", "例题：正方形拼图的规律", 3, &["规律", "代数式"],
      "用火柴棒按规律搭正方形：$1$ 个正方形用 $4$ 根，$2$ 个用 $7$ 根，$3$ 个用 $10$ 根……搭 $n$ 个正方形需要多少根？",
      vec![
        step("观察", "每多一个正方形多用 $3$ 根。", None),
        step("归纳", "需要 $3n + 1$ 根。", Some("3n + 1")),
      ],
      Some("归纳猜想"),
    ),
    // ---- t32: 线段 ----
    problem(
      "t32-example", "几何图形初步", "例题：线段中点", 3, &["线段", "整体思想"],
      "点 $C$ 在线段 $AB$ 上，$M$、$N$ 分别是 $AC$、$BC$ 的中点，$AB = 10$，求 $MN$。",
      vec![
        step("整体表示", "$MN = MC + CN = \\frac{1}{2}AC + \\frac{1}{2}BC$。", None),
        step("整体代入", "$MN = \\frac{1}{2}AB = 5$。", Some("MN = \\frac{1}{2}AB = 5")),
      ],
      Some("整体思想"),
    ),
    // ---- quizzes ----
    problem(
      "z1-quiz-1", "有理数", "专题集训一 第1题", 2, &["数轴"],
      "数轴上到原点距离为 $3$ 的点表示的数是多少？",
      vec![step("分类", "在原点右侧为 $3$，左侧为 $-3$。", None)],
      None,
    ),
    problem(
      "z1-quiz-2", "有理数", "专题集训一 第2题", 2, &["相反数"],
      "$-\\frac{1}{2}$ 的相反数与倒数之和是多少？",
      vec![step("计算", "相反数为 $\\frac{1}{2}$，倒数为 $-2$，和为 $-\\frac{3}{2}$。", None)],
      None,
    ),
    problem(
      "z1-quiz-3", "有理数", "专题集训一 第3题", 3, &["绝对值"],
      "已知 $|x| = 4$，$|y| = 1$，且 $x < y$，求 $x - y$。",
      vec![
        step("确定取值", "$x = \\pm 4$，$y = \\pm 1$，又 $x < y$，所以 $x = -4$。", None),
        step("计算", "$x - y = -5$ 或 $-3$。", None),
      ],
      None,
    ),
    problem(
      "z2-quiz-1", "有理数的运算", "专题集训二 第1题", 2, &["运算"],
      "计算 $(-2)^3 + (-3) \\times [(-4)^2 + 2]$。",
      vec![step("按顺序计算", "$-8 + (-3) \\times 18 = -8 - 54 = -62$。", Some("-62"))],
      None,
    ),
    problem(
      "z3-quiz-1", "代数式", "专题集训三 第1题", 2, &["代数式求值"],
      "已知 $x - 2y = 3$，求 $3 - 2x + 4y$ 的值。",
      vec![step("整体代入", "$3 - 2(x - 2y) = 3 - 6 = -3$。", None)],
      Some("整体思想"),
    ),
    problem(
      "z4-quiz-1", "整式的加减", "专题集训四 第1题", 3, &["整式"],
      "化简 $3a^2 - [5a - (\\frac{1}{2}a - 3) + 2a^2]$。",
      vec![step("去括号合并", "$= 3a^2 - 5a + \\frac{1}{2}a - 3 - 2a^2 = a^2 - \\frac{9}{2}a - 3$。", None)],
      None,
    ),
    problem(
      "z5-quiz-1", "一元一次方程", "专题集训五 第1题", 3, &["方程"],
      "解方程 $\\frac{x - 1}{2} - \\frac{2x + 1}{3} = 1$。",
      vec![
        step("去分母", "$3(x - 1) - 2(2x + 1) = 6$。", None),
        step("求解", "$-x - 5 = 6$，$x = -11$。", Some("x = -11")),
      ],
      None,
    ),
    problem(
      "z6-quiz-1", "几何图形初步", "专题集训六 第1题", 3, &["角"],
      "$\\angle AOB = 120^\\circ$，$OC$ 平分 $\\angle AOB$，求 $\\angle AOC$。",
      vec![step("角平分线", "$\\angle AOC = \\frac{1}{2} \\times 120^\\circ = 60^\\circ$。", None)],
      None,
    ),
    problem(
      "final-quiz-1", "有理数", "期末冲刺练 第1题", 2, &["数轴"],
      "数轴上点 $A$ 表示 $-3$，点 $B$ 表示 $2$，求 $AB$ 的长。",
      vec![step("距离公式", "$AB = |2 - (-3)| = 5$。", None)],
      None,
    ),
    problem(
      "final-quiz-2", "几何图形初步", "期末冲刺练 第2题", 3, &["正方体"],
      "一个正方体的展开图中，与“数”字相对的面上是什么字？",
      vec![step("隔一相对", "展开图中同一行隔一个的两个面相对。", None)],
      None,
    ),
  ]
}

/// Demo whiteboard solution returned when no AI provider key is configured.
pub fn demo_solution() -> Solution {
  fn math(id: &str, x: f64, y: f64, content: &str, color: &str, duration: u32) -> Drawing {
    Drawing {
      content: Some(content.into()),
      color: Some(color.into()),
      duration: Some(duration),
      ..Drawing::bare(id, DrawingKind::Math, x, y)
    }
  }
  fn text(id: &str, x: f64, y: f64, content: &str, color: &str, duration: u32) -> Drawing {
    Drawing { kind: DrawingKind::Text, ..math(id, x, y, content, color, duration) }
  }

  Solution {
    title: "演示：求解一元二次方程".into(),
    steps: vec![
      WhiteboardStep {
        explanation: "这是一个演示方案。要解决您真实的数学问题，请配置 API Key（OpenAI 或 Google Gemini）。".into(),
        drawings: vec![
          math("1", 50.0, 50.0, "x^2 + 5x + 6 = 0", "#1a1a1a", 1000),
          text("2", 50.0, 100.0, "识别系数: a=1, b=5, c=6", "#4f46e5", 800),
        ],
      },
      WhiteboardStep {
        explanation: "通过寻找两个数，它们的乘积等于 6 且和等于 5，来对方程进行因式分解。".into(),
        drawings: vec![
          text("3", 50.0, 150.0, "2 \\times 3 = 6 \\checkmark", "#10b981", 800),
          text("4", 50.0, 190.0, "2 + 3 = 5 \\checkmark", "#10b981", 800),
        ],
      },
      WhiteboardStep {
        explanation: "写出方程的因式分解形式。".into(),
        drawings: vec![math("5", 50.0, 240.0, "(x + 2)(x + 3) = 0", "#4f46e5", 1200)],
      },
      WhiteboardStep {
        explanation: "令每个因式等于零并求解 x。".into(),
        drawings: vec![
          math("6", 50.0, 290.0, "x = -2", "#ef4444", 1000),
          math("7", 150.0, 290.0, "x = -3", "#ef4444", 1000),
        ],
      },
    ],
    final_answer: "x = -2 或 x = -3".into(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn seed_ids_are_unique() {
    let problems = seed_problems();
    let ids: HashSet<_> = problems.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), problems.len());
  }

  #[test]
  fn every_seed_technique_exists_in_chapter_table() {
    let techniques: HashSet<String> = grade7_chapters()
      .into_iter()
      .flat_map(|c| c.techniques.into_iter().map(|t| t.id))
      .collect();
    for p in seed_problems().iter().filter(|p| p.id.starts_with('t')) {
      let tid = p.id.split('-').next().unwrap_or_default();
      assert!(techniques.contains(tid), "{} has no technique", p.id);
    }
  }

  #[test]
  fn demo_solution_has_four_steps() {
    let demo = demo_solution();
    assert_eq!(demo.steps.len(), 4);
    assert_eq!(demo.final_answer, "x = -2 或 x = -3");
    assert_eq!(demo.steps[1].drawings[0].kind, DrawingKind::Text);
  }
}
