use std::collections::{BTreeMap, HashMap, HashSet};

use good_lp::{
    default_solver, solvers::Solution, variable, Expression, ProblemVariables, ResolutionError,
    SolverModel, Variable,
};

use crate::error::{AppError, AppResult};
use crate::services::scoring::Candidate;

/// Maximum number of selected items sharing one dish-family key
pub const FAMILY_CAP: usize = 2;

/// The chosen subset of candidates plus its total cost
#[derive(Debug)]
pub struct Selection {
    pub items: Vec<Candidate>,
    pub total_cost: f64,
}

/// Solves the budget-constrained menu selection.
///
/// Hard constraints: total price within `budget`, at most one item per
/// portion group, at most [`FAMILY_CAP`] per dish family, and (when
/// `require_each_category` is set) at least one item per requested
/// category. Category priority is realized as soft per-category
/// sub-budgets solved in priority order, followed by a deterministic
/// greedy pass that spends whatever budget the sub-problems left over.
///
/// Candidates are canonically ordered by (priority rank, composite score
/// descending, price ascending, item id ascending) before anything else
/// happens; that ordering is also the tie-break of the greedy pass, so
/// identical inputs always produce identical selections.
pub fn select(
    candidates: Vec<Candidate>,
    budget: f64,
    categories: &[String],
    category_priority: &[String],
    require_each_category: bool,
) -> AppResult<Selection> {
    if budget <= 0.0 {
        return Err(AppError::InvalidBudget);
    }
    let categories = dedup_preserving_order(categories);
    if categories.is_empty() {
        return Err(AppError::NoCategorySelected);
    }

    let priority = effective_priority(&categories, category_priority);
    let rank: HashMap<&str, usize> = priority
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut candidates = candidates;
    candidates.sort_by(|a, b| {
        let rank_a = rank.get(a.item.category.as_str()).copied().unwrap_or(usize::MAX);
        let rank_b = rank.get(b.item.category.as_str()).copied().unwrap_or(usize::MAX);
        rank_a
            .cmp(&rank_b)
            .then(b.composite_score.total_cmp(&a.composite_score))
            .then(a.item.price.total_cmp(&b.item.price))
            .then(a.item.id.cmp(&b.item.id))
    });

    // Cheapest candidate per category, used both for the infeasibility
    // check and to reserve room for required categories not yet solved.
    let mut cheapest: HashMap<&str, f64> = HashMap::new();
    for candidate in &candidates {
        let entry = cheapest
            .entry(candidate.item.category.as_str())
            .or_insert(f64::INFINITY);
        *entry = entry.min(candidate.item.price);
    }

    if require_each_category {
        let mut reserve = 0.0;
        for category in &categories {
            match cheapest.get(category.as_str()) {
                Some(price) => reserve += price,
                None => {
                    return Err(AppError::Infeasible(format!(
                        "No menu items available for required category '{}'",
                        category
                    )));
                }
            }
        }
        if reserve > budget {
            return Err(AppError::Infeasible(format!(
                "Cheapest items for the required categories cost {:.2}, over the budget of {:.2}",
                reserve, budget
            )));
        }
    }

    // Rank-weighted sub-budgets: the k-th of n priority categories weighs
    // n - k, so earlier categories receive proportionally more budget.
    let n = priority.len();
    let weight_total: f64 = (1..=n).sum::<usize>() as f64;
    let sub_budget: HashMap<&str, f64> = priority
        .iter()
        .enumerate()
        .map(|(k, c)| (c.as_str(), budget * (n - k) as f64 / weight_total))
        .collect();

    let mut selected: Vec<Candidate> = Vec::new();
    let mut spent = 0.0;
    let mut used_portions: HashSet<String> = HashSet::new();
    let mut family_counts: HashMap<String, usize> = HashMap::new();

    // Phase 1: per-category sub-selection in priority order.
    for (k, category) in priority.iter().enumerate() {
        let required = require_each_category && categories.contains(category);

        // Budget still promised to required categories after this one.
        let reserve_after: f64 = if require_each_category {
            priority[k + 1..]
                .iter()
                .filter(|c| categories.contains(*c))
                .filter_map(|c| cheapest.get(c.as_str()))
                .sum()
        } else {
            0.0
        };

        let upper = budget - spent - reserve_after;
        let mut category_budget = sub_budget[category.as_str()].min(upper);
        if required {
            // The reserve guarantees upper >= cheapest, so raising the
            // sub-budget to the cheapest price keeps the problem solvable.
            category_budget = category_budget.max(cheapest[category.as_str()]).min(upper);
        }

        let pool: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| {
                c.item.category == *category
                    && !used_portions.contains(&c.portion_key)
                    && family_counts.get(&c.family_key).copied().unwrap_or(0) < FAMILY_CAP
            })
            .collect();

        let picks = solve_category(&pool, category_budget, required, &family_counts)?;
        for index in picks {
            let candidate = pool[index].clone();
            spent += candidate.item.price;
            used_portions.insert(candidate.portion_key.clone());
            *family_counts.entry(candidate.family_key.clone()).or_insert(0) += 1;
            selected.push(candidate);
        }
    }

    // Phase 2: one deterministic greedy pass spends the leftover budget
    // across all categories in canonical order.
    for candidate in &candidates {
        if candidate.item.price > budget - spent {
            continue;
        }
        if used_portions.contains(&candidate.portion_key) {
            continue;
        }
        if family_counts.get(&candidate.family_key).copied().unwrap_or(0) >= FAMILY_CAP {
            continue;
        }
        spent += candidate.item.price;
        used_portions.insert(candidate.portion_key.clone());
        *family_counts.entry(candidate.family_key.clone()).or_insert(0) += 1;
        selected.push(candidate.clone());
    }

    if selected.is_empty() {
        return Err(AppError::Infeasible(
            "No menu item fits within the given budget".to_string(),
        ));
    }

    // Keep the response ordering canonical rather than insertion-ordered.
    selected.sort_by(|a, b| {
        let rank_a = rank.get(a.item.category.as_str()).copied().unwrap_or(usize::MAX);
        let rank_b = rank.get(b.item.category.as_str()).copied().unwrap_or(usize::MAX);
        rank_a
            .cmp(&rank_b)
            .then(b.composite_score.total_cmp(&a.composite_score))
            .then(a.item.id.cmp(&b.item.id))
    });

    let total_cost = selected.iter().map(|c| c.item.price).sum();
    Ok(Selection {
        items: selected,
        total_cost,
    })
}

/// Solves one category's 0/1 sub-selection with the ILP solver: maximize
/// the summed composite score subject to the category budget, portion
/// exclusivity, remaining family capacity, and an optional at-least-one
/// constraint for required categories.
fn solve_category(
    pool: &[&Candidate],
    category_budget: f64,
    require_one: bool,
    family_counts: &HashMap<String, usize>,
) -> AppResult<Vec<usize>> {
    if pool.is_empty() {
        if require_one {
            return Err(AppError::Infeasible(
                "A required category has no selectable items left".to_string(),
            ));
        }
        return Ok(Vec::new());
    }

    let mut vars = ProblemVariables::new();
    let selection_vars: Vec<Variable> = pool.iter().map(|_| vars.add(variable().binary())).collect();

    let mut objective = Expression::from(0);
    let mut spend = Expression::from(0);
    for (candidate, &var) in pool.iter().zip(&selection_vars) {
        objective = objective + candidate.composite_score * var;
        spend = spend + candidate.item.price * var;
    }

    let mut constraints = vec![spend.leq(category_budget)];

    // Group members by portion and family keys; BTreeMap keeps the
    // constraint order stable across runs.
    let mut portion_groups: BTreeMap<&str, Vec<Variable>> = BTreeMap::new();
    let mut family_groups: BTreeMap<&str, Vec<Variable>> = BTreeMap::new();
    for (candidate, &var) in pool.iter().zip(&selection_vars) {
        portion_groups
            .entry(candidate.portion_key.as_str())
            .or_default()
            .push(var);
        family_groups
            .entry(candidate.family_key.as_str())
            .or_default()
            .push(var);
    }

    for (_, members) in portion_groups {
        if members.len() > 1 {
            let mut total = Expression::from(0);
            for var in members {
                total = total + var;
            }
            constraints.push(total.leq(1));
        }
    }
    for (family, members) in family_groups {
        let remaining = FAMILY_CAP - family_counts.get(family).copied().unwrap_or(0);
        if members.len() > remaining {
            let mut total = Expression::from(0);
            for var in members {
                total = total + var;
            }
            constraints.push(total.leq(remaining as f64));
        }
    }

    if require_one {
        let mut total = Expression::from(0);
        for &var in &selection_vars {
            total = total + var;
        }
        constraints.push(total.geq(1));
    }

    let mut problem = vars.maximise(objective).using(default_solver);
    for constraint in constraints {
        problem = problem.with(constraint);
    }

    let solution = problem.solve().map_err(|e| match e {
        ResolutionError::Infeasible => AppError::Infeasible(
            "A required category cannot be satisfied within its budget".to_string(),
        ),
        other => AppError::Solver(other.to_string()),
    })?;

    Ok(selection_vars
        .iter()
        .enumerate()
        .filter(|(_, &var)| solution.value(var) > 0.5)
        .map(|(index, _)| index)
        .collect())
}

/// Priority list covering every requested category: the caller's priority
/// entries restricted to the requested categories, then any requested
/// category missing from the priority list, in request order.
fn effective_priority(categories: &[String], category_priority: &[String]) -> Vec<String> {
    let mut priority: Vec<String> = category_priority
        .iter()
        .filter(|c| categories.contains(c))
        .cloned()
        .collect();
    for category in categories {
        if !priority.contains(category) {
            priority.push(category.clone());
        }
    }
    dedup_preserving_order(&priority)
}

fn dedup_preserving_order(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}
